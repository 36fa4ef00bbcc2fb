//! JSON serialization collaborator.
//!
//! [`JsonCodec`] handles [`RdfFormat::JsonLd`] only: objects are written as
//! their serde JSON form tagged with `@context` (the RMap namespace) and
//! `@type` (the object class term). It is not a JSON-LD processor; no
//! expansion or compaction is performed. Other formats are rejected with
//! `InvalidArgument`.

use rmap_core::vocabulary;
use rmap_core::{Agent, AgentContent, Disco, DiscoContent, Event, RdfCodec, RdfFormat, RmapError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

const CONTEXT_KEY: &str = "@context";
const TYPE_KEY: &str = "@type";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    fn ensure_supported(format: RdfFormat) -> Result<(), RmapError> {
        match format {
            RdfFormat::JsonLd => Ok(()),
            other => Err(RmapError::InvalidArgument(format!(
                "unsupported serialization format {other} ({})",
                other.media_type()
            ))),
        }
    }

    fn encode<T: Serialize>(
        value: &T,
        class: &str,
        format: RdfFormat,
    ) -> Result<Vec<u8>, RmapError> {
        Self::ensure_supported(format)?;
        let mut object = match serde_json::to_value(value) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(RmapError::IllegalState(
                    "object did not serialize to a JSON object".to_string(),
                ))
            }
            Err(e) => return Err(RmapError::IllegalState(format!("serialization failed: {e}"))),
        };
        let mut tagged = Map::with_capacity(object.len() + 2);
        tagged.insert(CONTEXT_KEY.to_string(), Value::from(vocabulary::RMAP_NS));
        tagged.insert(TYPE_KEY.to_string(), Value::from(class));
        tagged.append(&mut object);
        serde_json::to_vec_pretty(&Value::Object(tagged))
            .map_err(|e| RmapError::IllegalState(format!("serialization failed: {e}")))
    }

    fn decode<T: DeserializeOwned>(
        bytes: &[u8],
        class: &str,
        format: RdfFormat,
    ) -> Result<T, RmapError> {
        Self::ensure_supported(format)?;
        let mut object = match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(RmapError::InvalidArgument(
                    "expected a JSON object".to_string(),
                ))
            }
            Err(e) => return Err(RmapError::InvalidArgument(format!("malformed JSON: {e}"))),
        };
        object.remove(CONTEXT_KEY);
        if let Some(declared) = object.remove(TYPE_KEY) {
            if declared.as_str() != Some(class) {
                return Err(RmapError::InvalidArgument(format!(
                    "expected {TYPE_KEY} {class}, found {declared}"
                )));
            }
        }
        serde_json::from_value(Value::Object(object))
            .map_err(|e| RmapError::InvalidArgument(format!("invalid {class} body: {e}")))
    }
}

impl RdfCodec for JsonCodec {
    fn decode_disco(&self, bytes: &[u8], format: RdfFormat) -> Result<DiscoContent, RmapError> {
        let content: DiscoContent = Self::decode(bytes, vocabulary::DISCO, format)?;
        content.validate()?;
        Ok(content)
    }

    fn encode_disco(&self, disco: &Disco, format: RdfFormat) -> Result<Vec<u8>, RmapError> {
        Self::encode(disco, vocabulary::DISCO, format)
    }

    fn decode_agent(&self, bytes: &[u8], format: RdfFormat) -> Result<AgentContent, RmapError> {
        let content: AgentContent = Self::decode(bytes, vocabulary::AGENT, format)?;
        content.validate()?;
        Ok(content)
    }

    fn encode_agent(&self, agent: &Agent, format: RdfFormat) -> Result<Vec<u8>, RmapError> {
        Self::encode(agent, vocabulary::AGENT, format)
    }

    fn encode_event(&self, event: &Event, format: RdfFormat) -> Result<Vec<u8>, RmapError> {
        Self::encode(event, vocabulary::EVENT, format)
    }
}
