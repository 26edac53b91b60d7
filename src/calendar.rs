use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike, Utc};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::brokerage::{Agent, BusinessHours, BROKERAGE_NAME, BUSINESS_HOURS, BUSINESS_TZ, TIMEZONE_NAME};
use crate::google_auth::{GoogleAuthError, TokenProvider};
use crate::models::Intent;

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Offer at most this many appointment slots per call.
const MAX_OFFERED_SLOTS: usize = 4;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error(transparent)]
    Auth(#[from] GoogleAuthError),
    #[error("calendar request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("calendar API returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

/// An interval already taken on the shared calendar.
#[derive(Debug, Clone)]
pub struct BusyInterval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    start: Option<EventTime>,
    end: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
struct EventTime {
    /// Absent for all-day events, which do not block hourly slots.
    #[serde(rename = "dateTime")]
    date_time: Option<DateTime<FixedOffset>>,
}

/// -----------------------------
/// Scheduling Helper (Google Calendar v3)
/// -----------------------------
pub struct CalendarClient {
    client: Client,
    auth: Arc<TokenProvider>,
    calendar_id: String,
}

impl CalendarClient {
    pub fn new(auth: Arc<TokenProvider>, calendar_id: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            auth,
            calendar_id,
        }
    }

    /// Up to four open one-hour slots within business hours over the horizon.
    pub async fn open_slots(&self, horizon_days: i64) -> Result<Vec<DateTime<Tz>>, CalendarError> {
        let now = Utc::now().with_timezone(&BUSINESS_TZ);
        let horizon = now + Duration::days(horizon_days);
        let busy = self.busy_intervals(now, horizon).await?;
        Ok(scan_open_slots(now, horizon, &busy, &BUSINESS_HOURS))
    }

    async fn busy_intervals(
        &self,
        from: DateTime<Tz>,
        until: DateTime<Tz>,
    ) -> Result<Vec<BusyInterval>, CalendarError> {
        let token = self.auth.bearer_token().await?;
        let url = format!("{}/calendars/{}/events", CALENDAR_API, self.calendar_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[
                ("timeMin", from.to_rfc3339()),
                ("timeMax", until.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api { status, body });
        }

        let page: EventsPage = response.json().await?;
        let busy = page
            .items
            .into_iter()
            .filter_map(|event| {
                let start = event.start.and_then(|t| t.date_time)?;
                let end = event.end.and_then(|t| t.date_time)?;
                Some(BusyInterval {
                    start: start.with_timezone(&BUSINESS_TZ),
                    end: end.with_timezone(&BUSINESS_TZ),
                })
            })
            .collect();

        Ok(busy)
    }

    /// Create a one-hour appointment for the first offered slot.
    pub async fn book(
        &self,
        caller_id: &str,
        slot: DateTime<Tz>,
        agent: Option<&Agent>,
        intent: Option<Intent>,
    ) -> Result<(), CalendarError> {
        let token = self.auth.bearer_token().await?;
        let url = format!("{}/calendars/{}/events", CALENDAR_API, self.calendar_id);

        let label = consultation_label(intent);
        let event = json!({
            "summary": format!("{} — {} with {}", BROKERAGE_NAME, label, caller_id),
            "description": format!(
                "Caller: {}\nType: {}\nAgent: {}\nBooked via AI phone system.",
                caller_id,
                label,
                agent.map(|a| a.name).unwrap_or("TBD"),
            ),
            "start": {"dateTime": slot.to_rfc3339(), "timeZone": TIMEZONE_NAME},
            "end": {"dateTime": (slot + Duration::hours(1)).to_rfc3339(), "timeZone": TIMEZONE_NAME},
            "reminders": {
                "useDefault": false,
                "overrides": [
                    {"method": "email", "minutes": 60},
                    {"method": "popup", "minutes": 30},
                ],
            },
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&event)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api { status, body });
        }

        info!("Booked: {} for {} at {}", label, caller_id, slot);
        Ok(())
    }
}

/// Calendar event title for the detected intent.
pub fn consultation_label(intent: Option<Intent>) -> &'static str {
    match intent {
        Some(Intent::Buyer) => "Buyer Consultation",
        Some(Intent::Seller) => "Listing Consultation",
        Some(Intent::Renter) => "Rental Inquiry",
        None => "Consultation",
    }
}

/// Greedy forward scan: step hour by hour from the next full hour, keep the
/// first candidates that fall on a business day, inside business hours, and
/// clear of every busy interval. First feasible slots win.
fn scan_open_slots(
    now: DateTime<Tz>,
    horizon: DateTime<Tz>,
    busy: &[BusyInterval],
    hours: &BusinessHours,
) -> Vec<DateTime<Tz>> {
    let mut slots = Vec::new();
    let mut check = next_full_hour(now);

    while check < horizon && slots.len() < MAX_OFFERED_SLOTS {
        let slot_end = check + Duration::hours(1);
        let in_hours = hours.days.contains(&check.weekday())
            && (hours.start_hour..hours.end_hour).contains(&check.hour());
        let taken = busy
            .iter()
            .any(|b| b.start < slot_end && b.end > check);

        if in_hours && !taken {
            slots.push(check);
        }
        check = slot_end;
    }

    slots
}

fn next_full_hour(now: DateTime<Tz>) -> DateTime<Tz> {
    let into_hour = Duration::minutes(i64::from(now.minute()))
        + Duration::seconds(i64::from(now.second()))
        + Duration::nanoseconds(i64::from(now.nanosecond()));
    now - into_hour + Duration::hours(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Weekday};

    fn eastern(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        BUSINESS_TZ.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn open_morning_yields_first_four_hours() {
        // Monday, well before opening.
        let now = eastern(2026, 8, 10, 6, 30);
        let horizon = now + Duration::days(5);
        let slots = scan_open_slots(now, horizon, &[], &BUSINESS_HOURS);

        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0], eastern(2026, 8, 10, 8, 0));
        assert_eq!(slots[3], eastern(2026, 8, 10, 11, 0));
    }

    #[test]
    fn busy_intervals_block_overlapping_candidates() {
        let now = eastern(2026, 8, 10, 6, 30);
        let horizon = now + Duration::days(5);
        let busy = vec![BusyInterval {
            start: eastern(2026, 8, 10, 8, 0),
            end: eastern(2026, 8, 10, 9, 30),
        }];
        let slots = scan_open_slots(now, horizon, &busy, &BUSINESS_HOURS);

        assert_eq!(slots[0], eastern(2026, 8, 10, 10, 0));
        for slot in &slots {
            let end = *slot + Duration::hours(1);
            assert!(
                !busy.iter().any(|b| b.start < end && b.end > *slot),
                "slot {slot} overlaps a busy interval"
            );
        }
    }

    #[test]
    fn busy_end_touching_slot_start_does_not_block() {
        let now = eastern(2026, 8, 10, 6, 30);
        let horizon = now + Duration::days(5);
        let busy = vec![BusyInterval {
            start: eastern(2026, 8, 10, 8, 0),
            end: eastern(2026, 8, 10, 9, 0),
        }];
        let slots = scan_open_slots(now, horizon, &busy, &BUSINESS_HOURS);

        // Half-open overlap test: a meeting ending at 9 leaves the 9 o'clock
        // hour free.
        assert_eq!(slots[0], eastern(2026, 8, 10, 9, 0));
    }

    #[test]
    fn slots_skip_weekends_and_after_hours() {
        // Friday afternoon: nothing left today, weekend excluded, so the
        // first offers land Monday morning.
        let now = eastern(2026, 8, 7, 16, 30);
        let horizon = now + Duration::days(5);
        let slots = scan_open_slots(now, horizon, &[], &BUSINESS_HOURS);

        assert_eq!(slots.len(), 4);
        for slot in &slots {
            assert_eq!(slot.weekday(), Weekday::Mon);
            assert!(BUSINESS_HOURS.days.contains(&slot.weekday()));
            assert!((BUSINESS_HOURS.start_hour..BUSINESS_HOURS.end_hour).contains(&slot.hour()));
        }
        assert_eq!(slots[0], eastern(2026, 8, 10, 8, 0));
    }

    #[test]
    fn horizon_caps_the_scan() {
        let now = eastern(2026, 8, 10, 8, 15);
        let horizon = now + Duration::hours(2);
        let slots = scan_open_slots(now, horizon, &[], &BUSINESS_HOURS);

        // Scan starts at 9 and the horizon cuts off before a fourth slot.
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0], eastern(2026, 8, 10, 9, 0));
    }

    #[test]
    fn consultation_labels_follow_intent() {
        assert_eq!(consultation_label(Some(Intent::Buyer)), "Buyer Consultation");
        assert_eq!(consultation_label(Some(Intent::Seller)), "Listing Consultation");
        assert_eq!(consultation_label(Some(Intent::Renter)), "Rental Inquiry");
        assert_eq!(consultation_label(None), "Consultation");
    }
}
