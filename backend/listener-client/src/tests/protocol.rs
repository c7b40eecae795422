use crate::error::protocol::ProtocolError;
use crate::protocol::{Command, InboundMessage, decode};

use serde_json::{Value, json};

/// **VALUE**: Verifies decoding of both handshake messages.
///
/// **BUG THIS CATCHES**: Would catch a rename_all mismatch (`auth_challenge` vs
/// `authChallenge`) silently turning every challenge into `Other`.
#[test]
fn given_handshake_json_when_decoded_then_typed_messages() {
    assert_eq!(
        decode(r#"{"type":"authChallenge","salt":"abc"}"#).unwrap(),
        InboundMessage::AuthChallenge {
            salt: "abc".to_string()
        }
    );
    assert_eq!(
        decode(r#"{"type":"authResponse","status":"authenticated"}"#).unwrap(),
        InboundMessage::AuthResponse {
            status: "authenticated".to_string()
        }
    );
}

/// **VALUE**: Verifies that unknown types decode instead of failing.
///
/// **WHY THIS MATTERS**: After subscribing, the server streams sysInfo and
/// mousePosition updates. Those must be ignored quietly, not logged as errors.
#[test]
fn given_unknown_type_with_extra_fields_when_decoded_then_other() {
    let message = decode(r#"{"type":"sysInfo","cpu":12.5,"mem":{"used":1}}"#).unwrap();
    assert_eq!(message, InboundMessage::Other);
}

/// **VALUE**: Verifies that malformed input becomes a decode error.
#[test]
fn given_malformed_json_when_decoded_then_decode_error() {
    for raw in ["{not json", r#"{"salt":"abc"}"#, r#"{"type":"authChallenge"}"#] {
        let result = decode(raw);
        assert!(
            matches!(result, Err(ProtocolError::Decode { .. })),
            "{raw} should fail to decode"
        );
    }
}

/// **VALUE**: Verifies the exact wire shape of each typed command.
///
/// **BUG THIS CATCHES**: Would catch a missing `type` tag or snake_case names.
#[test]
fn given_typed_commands_when_encoded_then_wire_shapes_match() {
    let encoded = |command: Command| -> Value {
        serde_json::from_str(&command.encode().expect("encodes")).unwrap()
    };

    assert_eq!(
        encoded(Command::Auth {
            password: "d41d8cd98f00b204e9800998ecf8427e".to_string()
        }),
        json!({"type": "auth", "password": "d41d8cd98f00b204e9800998ecf8427e"})
    );
    assert_eq!(
        encoded(Command::SubscribeSysInfo),
        json!({"type": "subscribeSysInfo"})
    );
    assert_eq!(
        encoded(Command::unsubscribe("sysInfo")),
        json!({"type": "unsubscribe", "name": "sysInfo"})
    );
}

/// **VALUE**: Verifies that pass-through payloads keep every field and demand a type.
#[test]
fn given_passthrough_payload_when_built_then_requires_type_and_keeps_fields() {
    // GIVEN: A host command with arbitrary fields
    let payload = json!({"type": "keyCombinationPress", "key": "tab", "modifiers": ["alt"]});

    // WHEN: Wrapping and encoding
    let command = Command::passthrough(payload.clone()).expect("has a type");
    let wire: Value = serde_json::from_str(&command.encode().unwrap()).unwrap();

    // THEN: Byte-for-byte the same object
    assert_eq!(command.kind(), "keyCombinationPress");
    assert_eq!(wire, payload);

    // THEN: Payloads without a usable type are refused
    for bad in [json!({"key": "a"}), json!({"type": ""}), json!({"type": 3}), json!([1, 2])] {
        assert!(
            matches!(Command::passthrough(bad), Err(ProtocolError::Encode { .. })),
            "payload without string type should be refused"
        );
    }
}
