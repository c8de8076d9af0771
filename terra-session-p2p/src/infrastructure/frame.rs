use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// Frames exchanged over the matchbox data channels.
///
/// Discovery and the invitation handshake run in-band on the reliable
/// channel; application payloads ride either channel. UTF-8 payloads travel
/// as plain strings, anything else as base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Frame {
    /// Advertiser announces itself to browsers in the room
    #[serde(rename = "hello")]
    Hello { name: String, service: String },

    /// Browser invites an advertiser into its session
    #[serde(rename = "invite")]
    Invite { name: String, context: String },

    /// Advertiser answers an invitation
    #[serde(rename = "invite_reply")]
    InviteReply { name: String, accept: bool },

    /// Application payload that is valid UTF-8
    #[serde(rename = "text")]
    Text { payload: String },

    /// Binary application payload, base64 encoded
    #[serde(rename = "binary")]
    Binary { payload: String },
}

impl Frame {
    /// Wrap an application payload in the most compact frame
    pub fn payload(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Frame::Text {
                payload: text.to_string(),
            },
            Err(_) => Frame::Binary {
                payload: general_purpose::STANDARD.encode(bytes),
            },
        }
    }

    /// Bytes carried by a payload frame, `None` for control frames
    pub fn into_payload(self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        match self {
            Frame::Text { payload } => Some(Ok(payload.into_bytes())),
            Frame::Binary { payload } => Some(general_purpose::STANDARD.decode(payload)),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Invitation context as carried by [`Frame::Invite`]
pub fn encode_context(context: &[u8]) -> String {
    general_purpose::STANDARD.encode(context)
}

pub fn decode_context(context: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_serialization() {
        let frame = Frame::Invite {
            name: "Alice".to_string(),
            context: encode_context(&[1, 2, 3]),
        };

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"type\":\"invite\""));

        let deserialized = Frame::from_bytes(json.as_bytes()).unwrap();
        assert_eq!(deserialized, frame);
    }

    #[test]
    fn test_text_payload_travels_as_string() {
        let message = br#"{"id":"p1"}"#;
        let frame = Frame::payload(message);

        let bytes = frame.to_bytes().unwrap();
        assert_eq!(
            bytes,
            br#"{"type":"text","data":{"payload":"{\"id\":\"p1\"}"}}"#.to_vec()
        );

        let decoded = Frame::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.into_payload().unwrap().unwrap(), message.to_vec());
    }

    #[test]
    fn test_binary_payload_uses_base64() {
        let frame = Frame::payload(&[0xff, 0x00, 0x01]);

        assert_eq!(
            frame,
            Frame::Binary {
                payload: "/wAB".to_string()
            }
        );
        assert_eq!(frame.into_payload().unwrap().unwrap(), vec![0xff, 0x00, 0x01]);
    }

    #[test]
    fn test_control_frames_carry_no_payload() {
        let frame = Frame::InviteReply {
            name: "Bob".to_string(),
            accept: true,
        };
        assert!(frame.into_payload().is_none());

        let broken = Frame::Binary {
            payload: "not base64!".to_string(),
        };
        assert!(broken.into_payload().unwrap().is_err());
    }

    #[test]
    fn test_context_round_trip() {
        assert_eq!(decode_context(&encode_context(b"ctx")).unwrap(), b"ctx".to_vec());
        assert!(decode_context("%%%").is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Frame::from_bytes(br#"{"type":"teleport"}"#).is_err());
    }
}
