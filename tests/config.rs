use prism2d::color::Color;
use prism2d::config::{PowerPreference, RendererConfig};
use prism2d::error::RenderError;

#[test]
fn empty_object_gives_defaults() {
    let config = RendererConfig::from_json("{}").expect("defaults");
    assert_eq!(config, RendererConfig::default());
    assert_eq!((config.width, config.height), (800, 600));
    assert_eq!(config.batch_size, 2000);
    assert!(config.clear_before_render);
}

#[test]
fn camel_case_keys_are_read() {
    let config = RendererConfig::from_json(
        r#"{
            "width": 1024,
            "height": 768,
            "resolution": 2,
            "batchSize": 500,
            "clearBeforeRender": false,
            "preserveDrawingBuffer": true,
            "powerPreference": "high-performance"
        }"#,
    )
    .expect("config");
    assert_eq!((config.width, config.height), (1024, 768));
    assert_eq!(config.resolution, 2.0);
    assert_eq!(config.batch_size, 500);
    assert!(!config.clear_before_render);
    assert!(config.preserve_drawing_buffer);
    assert_eq!(config.power_preference, PowerPreference::HighPerformance);
}

#[test]
fn background_color_accepts_numbers_and_strings() {
    let hex = RendererConfig::from_json(r#"{ "backgroundColor": 16711680 }"#).expect("number");
    assert_eq!(hex.background_color, Color::rgb(255, 0, 0));

    let css = RendererConfig::from_json(r##"{ "backgroundColor": "#00ff00" }"##).expect("string");
    assert_eq!(css.background_color, Color::rgb(0, 255, 0));

    let rgba = RendererConfig::from_json(r#"{ "backgroundColor": "rgba(0, 0, 255, 0.5)" }"#).expect("rgba");
    assert_eq!(rgba.background_color, Color::rgba(0, 0, 255, 128));
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = RendererConfig::from_json("{ width: ").unwrap_err();
    assert!(matches!(err, RenderError::Config(_)));

    let err = RendererConfig::from_json(r#"{ "backgroundColor": "plaid" }"#).unwrap_err();
    assert!(matches!(err, RenderError::Config(_)));
}

#[test]
fn validate_rejects_unusable_values() {
    for json in [
        r#"{ "width": 0 }"#,
        r#"{ "height": 0 }"#,
        r#"{ "resolution": 0 }"#,
        r#"{ "resolution": -1.5 }"#,
        r#"{ "batchSize": 0 }"#,
    ] {
        let err = RendererConfig::from_json(json).unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(_)), "{json}: {err}");
    }
}

#[test]
fn context_attributes_follow_config() {
    let config = RendererConfig {
        transparent: true,
        antialias: false,
        power_preference: PowerPreference::LowPower,
        ..RendererConfig::default()
    };
    let attrs = config.context_attributes();
    assert!(attrs.alpha);
    assert!(!attrs.antialias);
    assert!(attrs.stencil);
    assert!(!attrs.depth);
    assert!(attrs.premultiplied_alpha);

    let json = serde_json::to_value(&attrs).expect("serialize");
    assert_eq!(json["powerPreference"], "low-power");
    assert_eq!(json["preserveDrawingBuffer"], false);
}

#[test]
fn transparent_game_clears_to_nothing() {
    let mut config = RendererConfig { background_color: Color::rgb(255, 0, 0), ..RendererConfig::default() };
    assert_eq!(config.clear_color(), [1.0, 0.0, 0.0, 1.0]);
    config.transparent = true;
    assert_eq!(config.clear_color(), [0.0, 0.0, 0.0, 0.0]);
}
