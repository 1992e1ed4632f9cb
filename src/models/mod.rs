pub mod envelope;
pub mod intent;
pub mod payloads;

pub use envelope::{BotRequest, BotSuccessResponse, CrmCall, SuccessResult, MAX_TRANSCRIPT_LEN};
pub use intent::{entity_str, Entities, Intent, NluResult};
pub use payloads::{LeadCreatePayload, LeadUpdatePayload, MissingEntity, VisitCreatePayload};
