//! Wire contract for the parameter records the control surface ships as JSON.

use rasterfx::{
    BlendMode, BlendParams, ChromaParams, FrameParams, GlobalParams, GlyphRamp, HalftoneShape,
    TextFont,
};

#[test]
fn frame_params_round_trip() {
    let params = FrameParams {
        global: GlobalParams {
            brightness: 1.3,
            colormatrix: 200.0,
            threshold: 90,
            ..GlobalParams::default()
        },
        blend: BlendParams {
            mode: BlendMode::HardMix,
            mix: 75.0,
            ..BlendParams::default()
        },
        mirror: true,
        ..FrameParams::default()
    };
    let json = serde_json::to_string(&params).unwrap();
    let back: FrameParams = serde_json::from_str(&json).unwrap();
    assert_eq!(params, back);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let params: FrameParams = serde_json::from_str(r#"{"global":{"blur":4.5}}"#).unwrap();
    assert_eq!(params.global.blur, 4.5);
    assert_eq!(params.global.brightness, 1.0);
    assert_eq!(params.blend, BlendParams::default());
    assert!(!params.layers.ascii);
}

#[test]
fn enums_use_their_wire_names() {
    assert_eq!(
        serde_json::to_string(&BlendMode::HardMix).unwrap(),
        r#""hard-mix""#
    );
    assert_eq!(
        serde_json::to_string(&TextFont::ComicSans).unwrap(),
        r#""Comic Sans MS""#
    );
    assert_eq!(
        serde_json::to_string(&HalftoneShape::Diamond).unwrap(),
        r#""diamond""#
    );
    assert_eq!(
        serde_json::to_string(&GlyphRamp::Blocks).unwrap(),
        r#""blocks""#
    );

    let mode: BlendMode = serde_json::from_str(r#""displacement""#).unwrap();
    assert_eq!(mode, BlendMode::Displacement);
}

#[test]
fn chroma_key_color_is_a_plain_string() {
    let chroma: ChromaParams =
        serde_json::from_str(r##"{"enabled":true,"key_color":"#112233"}"##).unwrap();
    assert!(chroma.enabled);
    assert_eq!(chroma.key_color, "#112233");
    assert_eq!(chroma.similarity, ChromaParams::default().similarity);
}
