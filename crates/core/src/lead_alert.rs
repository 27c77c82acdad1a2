//! "New leads" notification derivation.
//!
//! Compares the lead counts of a customer's two most recent metrics
//! snapshots. Only an increase produces an alert; the very first snapshot
//! never does.

/// Notification kind stored for lead alerts.
pub const LEAD_NOTIFICATION_KIND: &str = "lead";

/// An alert to be stored as a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadAlert {
    pub new_leads: i64,
    pub message: String,
}

/// Decide whether `latest` warrants a lead alert relative to `previous`.
pub fn derive_lead_alert(previous: Option<i64>, latest: i64) -> Option<LeadAlert> {
    let previous = previous?;
    let new_leads = latest - previous;
    if new_leads <= 0 {
        return None;
    }
    Some(LeadAlert {
        new_leads,
        message: lead_message(new_leads),
    })
}

/// Human-readable alert text with singular/plural agreement.
pub fn lead_message(new_leads: i64) -> String {
    if new_leads == 1 {
        "1 new lead via ads".to_string()
    } else {
        format!("{new_leads} new leads via ads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increase_produces_pluralized_alert() {
        let alert = derive_lead_alert(Some(5), 8).expect("alert");
        assert_eq!(alert.new_leads, 3);
        assert_eq!(alert.message, "3 new leads via ads");
    }

    #[test]
    fn single_lead_is_singular() {
        let alert = derive_lead_alert(Some(0), 1).expect("alert");
        assert_eq!(alert.message, "1 new lead via ads");
    }

    #[test]
    fn equal_or_lower_produces_nothing() {
        assert_eq!(derive_lead_alert(Some(8), 8), None);
        assert_eq!(derive_lead_alert(Some(8), 2), None);
    }

    #[test]
    fn first_snapshot_produces_nothing() {
        assert_eq!(derive_lead_alert(None, 50), None);
    }
}
