use keyspring_core::hotkey::{parse_hotkey, Key, Modifier};

#[test]
fn canonicalizes_case_and_spacing() {
    let hotkey = parse_hotkey("ctrl + alt + o").unwrap();
    assert_eq!(hotkey.canonical(), "Ctrl+Alt+O");
}

#[test]
fn modifier_order_is_normalized() {
    let hotkey = parse_hotkey("shift+ctrl+p").unwrap();
    assert_eq!(hotkey.canonical(), "Ctrl+Shift+P");
    assert_eq!(hotkey.modifiers, vec![Modifier::Ctrl, Modifier::Shift]);
}

#[test]
fn repeated_modifiers_collapse() {
    let hotkey = parse_hotkey("ctrl+control+x").unwrap();
    assert_eq!(hotkey.canonical(), "Ctrl+X");
}

#[test]
fn space_and_function_keys_parse() {
    assert_eq!(parse_hotkey("Win+Space").unwrap().key, Key::Space);
    assert_eq!(parse_hotkey("Ctrl+f12").unwrap().key, Key::Function(12));
    assert_eq!(parse_hotkey("Ctrl+F12").unwrap().canonical(), "Ctrl+F12");
}

#[test]
fn bare_keys_are_rejected() {
    assert!(parse_hotkey("O").is_err());
    assert!(parse_hotkey("").is_err());
}

#[test]
fn unknown_modifiers_are_rejected() {
    assert!(parse_hotkey("hyper+o").is_err());
}

#[test]
fn out_of_range_function_keys_are_rejected() {
    assert!(parse_hotkey("Ctrl+F25").is_err());
    assert!(parse_hotkey("Ctrl+F0").is_err());
}

#[test]
fn multi_character_keys_are_rejected() {
    assert!(parse_hotkey("Ctrl+Enter").is_err());
}
