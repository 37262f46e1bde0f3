// Orphan ticket recovery
// Binds tickets purchased or granted without an account to a user
// identity once an account with the matching email exists. Runs after
// account creation and login; must never fail those flows.

use tracing::{error, info};

use backend_domain::{normalize_email, CasOutcome, RecoveryStatus};

use crate::dtos::LinkOutcome;
use crate::AppState;

/// Link every unbound ticket whose customer email matches to `uid`.
///
/// Idempotent: linked tickets stop matching the unbound query, so a
/// second run finds nothing. Failures are logged and swallowed.
pub async fn link_orphan_tickets(state: &AppState, uid: &str, email: &str) -> LinkOutcome {
    let email = normalize_email(email);
    let matches = match state
        .ticket_repo
        .find_unbound_by_customer_email(&email)
        .await
    {
        Ok(matches) => matches,
        Err(err) => {
            error!("orphan lookup failed for {email}: {err}");
            return LinkOutcome { linked_count: 0 };
        }
    };

    let now = state.clock.now();
    let mut linked_count = 0;
    for ticket in matches {
        // A concurrent linking run may have claimed the ticket between
        // the query and this write; the CAS conflict path re-reads and
        // simply skips anything no longer unbound.
        let mut current = ticket;
        loop {
            if current.user_id.is_some() {
                break;
            }
            let expected = current.revision;
            let mut updated = current.clone();
            updated.user_id = Some(uid.to_string());
            updated.linked_at = Some(now);
            updated.linked_via = Some("auto_recovery".to_string());
            if let Some(recovery) = updated.orphan_recovery_data.as_mut() {
                recovery.recovery_status = RecoveryStatus::Recovered;
                recovery.recovered_at = Some(now);
                recovery.linked_to_user = Some(uid.to_string());
            }
            updated.revision = expected + 1;

            match state.ticket_repo.compare_and_update(expected, &updated).await {
                Ok(CasOutcome::Updated) => {
                    linked_count += 1;
                    break;
                }
                Ok(CasOutcome::Missing) => break,
                Ok(CasOutcome::Conflict) => {
                    match state.ticket_repo.get(&updated.id).await {
                        Ok(Some(fresh)) => current = fresh,
                        Ok(None) => break,
                        Err(err) => {
                            error!("orphan re-read failed for {}: {err}", updated.id);
                            break;
                        }
                    }
                }
                Err(err) => {
                    error!("orphan link write failed for {}: {err}", updated.id);
                    break;
                }
            }
        }
    }

    if linked_count > 0 {
        info!("linked {linked_count} orphan ticket(s) to {uid}");
        state.metrics.record_orphans_linked(linked_count);
    }
    LinkOutcome { linked_count }
}
