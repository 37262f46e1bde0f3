use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    orders_captured: AtomicU64,
    tickets_issued: AtomicU64,
    courtesy_issued: AtomicU64,
    checkins: AtomicU64,
    undos: AtomicU64,
    rejected_scans: AtomicU64,
    orphans_linked: AtomicU64,
}

impl Metrics {
    pub fn record_capture(&self, ticket_count: usize) {
        self.orders_captured.fetch_add(1, Ordering::Relaxed);
        self.tickets_issued
            .fetch_add(ticket_count as u64, Ordering::Relaxed);
    }

    pub fn record_courtesy(&self, ticket_count: usize) {
        self.courtesy_issued
            .fetch_add(ticket_count as u64, Ordering::Relaxed);
        self.tickets_issued
            .fetch_add(ticket_count as u64, Ordering::Relaxed);
    }

    pub fn record_checkin(&self) {
        self.checkins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_undo(&self) {
        self.undos.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_scan(&self) {
        self.rejected_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_orphans_linked(&self, count: usize) {
        self.orphans_linked
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let orders = self.orders_captured.load(Ordering::Relaxed);
        let tickets = self.tickets_issued.load(Ordering::Relaxed);
        let courtesy = self.courtesy_issued.load(Ordering::Relaxed);
        let checkins = self.checkins.load(Ordering::Relaxed);
        let undos = self.undos.load(Ordering::Relaxed);
        let rejected = self.rejected_scans.load(Ordering::Relaxed);
        let linked = self.orphans_linked.load(Ordering::Relaxed);

        format!(
            "# TYPE entrada_orders_captured_total counter\n\
entrada_orders_captured_total {}\n\
# TYPE entrada_tickets_issued_total counter\n\
entrada_tickets_issued_total {}\n\
# TYPE entrada_courtesy_issued_total counter\n\
entrada_courtesy_issued_total {}\n\
# TYPE entrada_checkins_total counter\n\
entrada_checkins_total {}\n\
# TYPE entrada_undos_total counter\n\
entrada_undos_total {}\n\
# TYPE entrada_rejected_scans_total counter\n\
entrada_rejected_scans_total {}\n\
# TYPE entrada_orphans_linked_total counter\n\
entrada_orphans_linked_total {}\n",
            orders, tickets, courtesy, checkins, undos, rejected, linked
        )
    }
}
