// Payment capture and paid ticket issuance

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::warn;

use backend_domain::{normalize_email, AuthenticatedUser, ResolvedIdentity, TicketType};

use crate::commands::issuance::{self, TicketBatchSpec};
use crate::dtos::{AccountOutcome, CaptureOrderRequest, CaptureOrderResponse, ContactInfo};
use crate::{AppError, AppState};

/// Capture an approved payment and issue the order's tickets.
///
/// Replayed captures for an already-fulfilled order id return the
/// existing tickets and never reach the payment processor again.
pub async fn capture_order(
    state: &AppState,
    caller: Option<&AuthenticatedUser>,
    payload: CaptureOrderRequest,
) -> Result<CaptureOrderResponse, AppError> {
    let order_id = payload.order_id.trim().to_string();
    if order_id.is_empty() {
        return Err(AppError::InvalidInput("order_id must not be empty".to_string()));
    }
    if payload.items.is_empty() {
        return Err(AppError::InvalidInput("cart is empty".to_string()));
    }
    if payload.items.iter().any(|item| item.quantity == 0) {
        return Err(AppError::InvalidInput(
            "quantities must be at least 1".to_string(),
        ));
    }
    issuance::validate_contact(&payload.customer)?;

    let existing = state
        .ticket_repo
        .find_by_order_id(&order_id)
        .await
        .map_err(AppError::Internal)?;
    if !existing.is_empty() {
        return Ok(CaptureOrderResponse {
            tickets: existing,
            already_issued: true,
            account: None,
            custom_token: None,
        });
    }

    let capture = state
        .payments
        .capture(&order_id)
        .await
        .map_err(AppError::Internal)?;
    if !capture.is_completed() {
        return Err(AppError::PaymentNotCompleted(capture.status));
    }

    let event = state
        .event_repo
        .get(&payload.event_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("event"))?;

    let mut items: Vec<(TicketType, u32)> = Vec::new();
    for item in &payload.items {
        let ticket_type = state
            .ticket_type_repo
            .get(&item.ticket_type_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("ticket type"))?;
        if ticket_type.event_id != event.id {
            return Err(AppError::InvalidInput(format!(
                "ticket type {} does not belong to event {}",
                ticket_type.id, event.id
            )));
        }
        items.push((ticket_type, item.quantity));
    }

    let (identity, account, custom_token) =
        resolve_identity(state, caller, &payload.customer, payload.create_account).await;

    let now = state.clock.now();
    let spec = TicketBatchSpec {
        event: &event,
        order_id: &order_id,
        customer: &payload.customer,
        identity: &identity,
        auto_link: true,
        courtesy_type: None,
        now,
    };
    let tickets = issuance::build_tickets(&spec, &items);
    state
        .ticket_repo
        .insert_batch(&tickets)
        .await
        .map_err(AppError::Internal)?;

    // Best-effort side effects; the tickets are already the source of truth.
    for (ticket_type, quantity) in &items {
        if let Err(err) = state
            .ticket_type_repo
            .increment_sold_count(&ticket_type.id, *quantity)
            .await
        {
            warn!("sold count increment failed for {}: {}", ticket_type.id, err);
        }
    }
    state
        .notifications
        .spawn_ticket_email(state.config.clone(), tickets.clone());
    state.metrics.record_capture(tickets.len());

    Ok(CaptureOrderResponse {
        tickets,
        already_issued: false,
        account: Some(account),
        custom_token,
    })
}

/// Resolve who owns the order. Account creation failure is non-fatal:
/// the purchase proceeds as guest and a recovery email goes out instead.
async fn resolve_identity(
    state: &AppState,
    caller: Option<&AuthenticatedUser>,
    customer: &ContactInfo,
    create_account: bool,
) -> (ResolvedIdentity, AccountOutcome, Option<String>) {
    if let Some(user) = caller {
        return (
            ResolvedIdentity::Bound {
                uid: user.uid.clone(),
            },
            AccountOutcome::Bound,
            None,
        );
    }
    let email = normalize_email(&customer.email);
    if !create_account {
        return (ResolvedIdentity::Guest { email }, AccountOutcome::Guest, None);
    }

    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    match state
        .identity
        .create_user(&email, &password, customer.name.trim())
        .await
    {
        Ok(uid) => {
            let custom_token = match state.identity.create_custom_token(&uid).await {
                Ok(token) => Some(token),
                Err(err) => {
                    warn!("custom token mint failed for {uid}: {err}");
                    None
                }
            };
            (
                ResolvedIdentity::NewAccount {
                    uid,
                    custom_token: custom_token.clone(),
                },
                AccountOutcome::Created,
                custom_token,
            )
        }
        Err(err) => {
            warn!("account creation failed for {email}: {err}; falling back to guest");
            state
                .notifications
                .spawn_recovery_email(state.config.clone(), email.clone());
            (
                ResolvedIdentity::Guest { email },
                AccountOutcome::CreationFailed,
                None,
            )
        }
    }
}
