// Shared ticket construction for paid and courtesy issuance

use chrono::{DateTime, Utc};
use uuid::Uuid;

use backend_domain::{
    access_policy, normalize_email, Event, OrphanRecoveryData, RecoveryStatus, ResolvedIdentity,
    Ticket, TicketStatus, TicketType,
};

use crate::dtos::ContactInfo;

pub(crate) struct TicketBatchSpec<'a> {
    pub event: &'a Event,
    pub order_id: &'a str,
    pub customer: &'a ContactInfo,
    pub identity: &'a ResolvedIdentity,
    /// When false, unbound tickets stay unbound forever.
    pub auto_link: bool,
    pub courtesy_type: Option<&'a str>,
    pub now: DateTime<Utc>,
}

/// Build every ticket of one order. Attendee fields always start blank;
/// they are configured per ticket later.
pub(crate) fn build_tickets(
    spec: &TicketBatchSpec<'_>,
    items: &[(TicketType, u32)],
) -> Vec<Ticket> {
    let provenance = match spec.courtesy_type {
        Some(courtesy_type) => format!("courtesy:{courtesy_type}"),
        None => "purchase".to_string(),
    };
    let recovery = match spec.identity {
        ResolvedIdentity::Guest { email } if spec.auto_link => Some(OrphanRecoveryData {
            target_email: normalize_email(email),
            recovery_status: RecoveryStatus::Pending,
            provenance,
            recovered_at: None,
            linked_to_user: None,
        }),
        _ => None,
    };

    let mut tickets = Vec::new();
    for (ticket_type, quantity) in items {
        let authorized_days = access_policy::authorized_days_for(ticket_type, spec.event);
        for _ in 0..*quantity {
            tickets.push(Ticket {
                id: Uuid::new_v4().simple().to_string(),
                qr_id: Uuid::new_v4().simple().to_string(),
                order_id: spec.order_id.to_string(),
                event_id: spec.event.id.clone(),
                ticket_type_id: ticket_type.id.clone(),
                user_id: spec.identity.uid().map(str::to_string),
                customer_name: spec.customer.name.trim().to_string(),
                customer_email: normalize_email(&spec.customer.email),
                customer_phone: spec.customer.phone.clone(),
                attendee_name: None,
                attendee_email: None,
                attendee_phone: None,
                status: TicketStatus::Purchased,
                is_courtesy: spec.courtesy_type.is_some(),
                courtesy_type: spec.courtesy_type.map(str::to_string),
                price: ticket_type.price,
                currency: ticket_type.currency.clone(),
                authorized_days: authorized_days.clone(),
                used_days: Vec::new(),
                last_checkin: None,
                last_checkin_by: None,
                last_checkin_day: None,
                can_undo_until: None,
                linked_at: None,
                linked_via: None,
                orphan_recovery_data: recovery.clone(),
                created_at: spec.now,
                revision: 0,
            });
        }
    }
    tickets
}

pub(crate) fn validate_contact(contact: &ContactInfo) -> Result<(), crate::AppError> {
    if contact.name.trim().is_empty() {
        return Err(crate::AppError::InvalidInput(
            "contact name must not be empty".to_string(),
        ));
    }
    if contact.email.trim().is_empty() || !contact.email.contains('@') {
        return Err(crate::AppError::InvalidInput(
            "contact email is not valid".to_string(),
        ));
    }
    Ok(())
}
