// Ticket grouping
// Shapes a flat ticket list into the Event -> Order -> Ticket hierarchy
// the storefront renders. Downstream display depends on this ordering,
// so the contract here is load-bearing: upcoming events first (soonest
// start ascending), past events after (most recent start first), orders
// newest-first within an event, every ticket in exactly one bucket.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::entities::{Event, Ticket};
use crate::value_objects::TicketStatus;

#[derive(Debug, Clone, Serialize)]
pub struct OrderGroup {
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub configured: usize,
    pub pending: usize,
    pub used: usize,
    pub total_amount: i64,
    pub currency: String,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventGroup {
    pub event_id: String,
    pub event_name: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub orders: Vec<OrderGroup>,
}

pub fn group_tickets(
    tickets: Vec<Ticket>,
    events: &HashMap<String, Event>,
    today: NaiveDate,
) -> Vec<EventGroup> {
    let mut by_event: HashMap<String, Vec<Ticket>> = HashMap::new();
    for ticket in tickets {
        by_event.entry(ticket.event_id.clone()).or_default().push(ticket);
    }

    let mut groups: Vec<EventGroup> = by_event
        .into_iter()
        .map(|(event_id, tickets)| build_event_group(event_id, tickets, events))
        .collect();

    groups.sort_by(|a, b| {
        let a_upcoming = a.end_date >= today;
        let b_upcoming = b.end_date >= today;
        match (a_upcoming, b_upcoming) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            // upcoming: soonest first; past: most recent first
            (true, true) => a.start_date.cmp(&b.start_date),
            (false, false) => b.start_date.cmp(&a.start_date),
        }
    });
    groups
}

fn build_event_group(
    event_id: String,
    tickets: Vec<Ticket>,
    events: &HashMap<String, Event>,
) -> EventGroup {
    let mut by_order: HashMap<String, Vec<Ticket>> = HashMap::new();
    for ticket in tickets {
        by_order.entry(ticket.order_id.clone()).or_default().push(ticket);
    }

    let mut orders: Vec<OrderGroup> = by_order
        .into_iter()
        .map(|(order_id, tickets)| build_order_group(order_id, tickets))
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    // A ticket referencing a vanished event still has to surface; fall
    // back to placeholder metadata dated far in the past.
    let (event_name, location, start_date, end_date) = match events.get(&event_id) {
        Some(event) => (
            event.name.clone(),
            event.location.clone(),
            event.start_date,
            event.end_date,
        ),
        None => (
            event_id.clone(),
            String::new(),
            NaiveDate::MIN,
            NaiveDate::MIN,
        ),
    };

    EventGroup {
        event_id,
        event_name,
        location,
        start_date,
        end_date,
        orders,
    }
}

fn build_order_group(order_id: String, mut tickets: Vec<Ticket>) -> OrderGroup {
    tickets.sort_by(|a, b| a.id.cmp(&b.id));
    let created_at = tickets
        .iter()
        .map(|ticket| ticket.created_at)
        .max()
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let configured = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Configured)
        .count();
    let pending = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Purchased)
        .count();
    let used = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Used)
        .count();
    let total_amount = tickets.iter().map(|t| t.price).sum();
    let currency = tickets
        .first()
        .map(|t| t.currency.clone())
        .unwrap_or_default();

    OrderGroup {
        order_id,
        created_at,
        configured,
        pending,
        used,
        total_amount,
        currency,
        tickets,
    }
}
