//! # Codec v0.1
//!
//! [`CodecV01`] picks a binary or structured routine for every call through a
//! static strategy table keyed on [`Encoding`]. The codec is immutable once
//! built and safe to share between handlers.

use crate::config::{CodecConfig, MAX_BODY_SIZE, SPEC_VERSION_V01};
use crate::core::message::{HeaderedMessage, Message};
use crate::core::serialization::{JsonMarshaler, PayloadMarshaler};
use crate::error::{CodecError, Decoded, Result};
use crate::event::{Data, Event, EventContextV01};
use crate::extensions::TracingAttributes;
use crate::protocol::{binary, inspect_encoding, structured, Codec, Encoding};
use crate::utils::metrics::{global_metrics, Timer};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

type EncodeFn = fn(&CodecV01, &EventContextV01, Option<&Data>) -> Result<Message>;
type DecodeFn = fn(&CodecV01, &mut dyn HeaderedMessage) -> Result<Decoded<Event>>;

/// Encode/decode routine pair for one wire encoding
struct Strategy {
    name: &'static str,
    encode: EncodeFn,
    decode: DecodeFn,
}

static BINARY: Strategy = Strategy {
    name: "binary",
    encode: encode_binary,
    decode: decode_binary,
};

static STRUCTURED: Strategy = Strategy {
    name: "structured",
    encode: encode_structured,
    decode: decode_structured,
};

fn strategy(encoding: Encoding) -> Option<&'static Strategy> {
    match encoding {
        Encoding::Default | Encoding::BinaryV01 => Some(&BINARY),
        Encoding::StructuredV01 => Some(&STRUCTURED),
        Encoding::Unknown => None,
    }
}

fn encode_binary(codec: &CodecV01, ctx: &EventContextV01, data: Option<&Data>) -> Result<Message> {
    binary::encode(ctx, data, codec.encoding, codec.marshaler.as_ref())
}

fn decode_binary(_codec: &CodecV01, msg: &mut dyn HeaderedMessage) -> Result<Decoded<Event>> {
    binary::decode(msg)
}

fn encode_structured(
    codec: &CodecV01,
    ctx: &EventContextV01,
    data: Option<&Data>,
) -> Result<Message> {
    structured::encode(ctx, data, codec.marshaler.as_ref())
}

fn decode_structured(_codec: &CodecV01, msg: &mut dyn HeaderedMessage) -> Result<Decoded<Event>> {
    structured::decode(&*msg)
}

/// CloudEvents v0.1 codec
#[derive(Clone)]
pub struct CodecV01 {
    encoding: Encoding,
    marshaler: Arc<dyn PayloadMarshaler>,
    tracing: Option<Arc<TracingAttributes>>,
    max_body_size: usize,
    strict_validation: bool,
}

impl fmt::Debug for CodecV01 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecV01")
            .field("encoding", &self.encoding)
            .field("tracing", &self.tracing.is_some())
            .field("max_body_size", &self.max_body_size)
            .field("strict_validation", &self.strict_validation)
            .finish_non_exhaustive()
    }
}

impl Default for CodecV01 {
    fn default() -> Self {
        Self::new(Encoding::Default)
    }
}

impl CodecV01 {
    /// Codec encoding with `encoding`, the JSON marshaler and default limits
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            marshaler: Arc::new(JsonMarshaler),
            tracing: None,
            max_body_size: MAX_BODY_SIZE,
            strict_validation: false,
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(config.codec.encoding)
            .with_max_body_size(config.limits.max_body_size)
            .with_strict_validation(config.codec.strict_validation)
    }

    pub fn with_marshaler(mut self, marshaler: Arc<dyn PayloadMarshaler>) -> Self {
        self.marshaler = marshaler;
        self
    }

    /// Apply `attributes` to a copy of every outgoing context before it is mapped
    pub fn with_tracing(mut self, attributes: Arc<TracingAttributes>) -> Self {
        self.tracing = Some(attributes);
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn check_body_size(&self, size: usize) -> Result<()> {
        if size > self.max_body_size {
            return Err(CodecError::OversizedBody(size));
        }
        Ok(())
    }

    fn prepare<'a>(&self, ctx: &'a EventContextV01) -> Result<Cow<'a, EventContextV01>> {
        if ctx.cloud_events_version != SPEC_VERSION_V01 {
            return Err(CodecError::VersionMismatch {
                expected: SPEC_VERSION_V01.to_string(),
                found: ctx.cloud_events_version.clone(),
            });
        }
        if self.strict_validation {
            let errors = ctx.validate();
            if !errors.is_empty() {
                return Err(CodecError::InvalidContext(errors.join("; ")));
            }
        }

        let mut ctx = Cow::Borrowed(ctx);
        if let Some(attributes) = &self.tracing {
            attributes.apply(ctx.to_mut())?;
        }
        Ok(ctx)
    }
}

impl Codec for CodecV01 {
    #[instrument(skip_all, fields(encoding = %self.encoding))]
    fn encode(&self, event: &Event) -> Result<Message> {
        let _timer = Timer::start("encode");

        let strategy = strategy(self.encoding)
            .ok_or_else(|| CodecError::UnsupportedEncoding(self.encoding.to_string()))?;
        let ctx = event
            .context
            .as_v01()
            .ok_or_else(|| CodecError::VersionMismatch {
                expected: SPEC_VERSION_V01.to_string(),
                found: event.context.spec_version().to_string(),
            })?;
        let ctx = self.prepare(ctx)?;

        debug!(strategy = strategy.name, "Encoding event");
        let msg = (strategy.encode)(self, &*ctx, event.data.as_ref())?;
        self.check_body_size(msg.body.len())?;

        global_metrics().event_encoded(self.encoding, msg.body.len() as u64);
        Ok(msg)
    }

    #[instrument(skip_all)]
    fn decode(&self, msg: &mut dyn HeaderedMessage) -> Result<Decoded<Event>> {
        let _timer = Timer::start("decode");
        let metrics = global_metrics();

        let encoding = inspect_encoding(&*msg);
        let Some(strategy) = strategy(encoding) else {
            metrics.decode_failed();
            return Err(CodecError::UnsupportedEncoding(encoding.to_string()));
        };

        let size = msg.body().len();
        if let Err(e) = self.check_body_size(size) {
            metrics.decode_failed();
            return Err(e);
        }

        debug!(strategy = strategy.name, size, "Decoding message");
        match (strategy.decode)(self, msg) {
            Ok(decoded) => {
                metrics.event_decoded(size as u64, decoded.warnings.len() as u64);
                Ok(decoded)
            }
            Err(e) => {
                warn!(error = %e, strategy = strategy.name, "Decode failed");
                metrics.decode_failed();
                Err(e)
            }
        }
    }
}
