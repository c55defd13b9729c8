//! Payload validation and changeset construction for ticket mutations.

mod changeset;
mod checks;
mod payload;

pub use changeset::{format_software, software_change, tracked_field_changes};
pub use checks::{
    MIN_DESCRIPTION_CHARS, TicketAction, UpdateValidation, ValidatedNewTicket,
    parse_contract_ref, validate_new_ticket, validate_ticket_action, validate_ticket_update,
};
pub use payload::{NewTicketPayload, SoftwarePayload, TicketUpdatePayload, UpdateAction};
