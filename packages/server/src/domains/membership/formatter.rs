//! Audit message rendering.
//!
//! `EventFormatter` turns a `MembershipChangeFact` into the payload consumed
//! by the notification services. It does no I/O and reads no clock, so the
//! same fact always renders the same bytes.

use chrono::{Datelike, FixedOffset, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::events::{MembershipAction, MembershipChangeFact};
use crate::common::ProjectId;

/// Version stamped on every payload so consumers can evolve with the schema.
pub const PAYLOAD_SCHEMA_VERSION: u32 = 1;

/// Message published for each membership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub schema_version: u32,
    pub project_id: ProjectId,
    pub project_name: String,
    pub member_name: String,
    /// Empty when the member has no phone number on record.
    pub member_phone: String,
    pub action: String,
    pub message: String,
}

/// Western Indonesia Time (UTC+7), the default wall clock for messages.
pub fn western_indonesia_time() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap_or(Utc.fix())
}

/// Language used for weekday and month names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageLocale {
    #[default]
    Indonesian,
    English,
}

impl MessageLocale {
    fn weekday_name(self, day: Weekday) -> &'static str {
        const ID: [&str; 7] = ["Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu"];
        const EN: [&str; 7] = [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ];
        let idx = day.num_days_from_monday() as usize;
        match self {
            Self::Indonesian => ID[idx],
            Self::English => EN[idx],
        }
    }

    fn month_name(self, month: u32) -> &'static str {
        const ID: [&str; 12] = [
            "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus",
            "September", "Oktober", "November", "Desember",
        ];
        const EN: [&str; 12] = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        // chrono months are 1-based
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Self::Indonesian => ID[idx],
            Self::English => EN[idx],
        }
    }
}

impl FromStr for MessageLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" | "id_id" | "indonesian" => Ok(Self::Indonesian),
            "en" | "en_us" | "english" => Ok(Self::English),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

/// Renders facts into notification payloads.
#[derive(Debug, Clone, Copy)]
pub struct EventFormatter {
    locale: MessageLocale,
    offset: FixedOffset,
}

impl EventFormatter {
    /// `offset` is the wall-clock zone the message should read in.
    pub fn new(locale: MessageLocale, offset: FixedOffset) -> Self {
        Self { locale, offset }
    }

    pub fn format(&self, fact: &MembershipChangeFact) -> NotificationPayload {
        NotificationPayload {
            schema_version: PAYLOAD_SCHEMA_VERSION,
            project_id: fact.project_id(),
            project_name: fact.project_name().to_string(),
            member_name: fact.member_name().to_string(),
            member_phone: fact.member_phone().unwrap_or_default().to_string(),
            action: fact.action().label().to_string(),
            message: self.message(fact),
        }
    }

    /// The human-readable audit line for `fact`.
    pub fn message(&self, fact: &MembershipChangeFact) -> String {
        let actor = fact.actor_name();
        let member = fact.member_name();
        let project = fact.project_name();
        let when = self.when(fact);

        match fact.action() {
            MembershipAction::AddMember => {
                format!("{actor} menambahkan {member} ke project {project} {when}")
            }
            MembershipAction::UpdateMember { role_names } => format!(
                "{actor} merubah {member} menjadi role {} di project {project} {when}",
                role_names.join(", ")
            ),
            MembershipAction::DeleteMember => {
                format!("{actor} telah menghapus {member} dari project {project} {when}")
            }
        }
    }

    fn when(&self, fact: &MembershipChangeFact) -> String {
        let local = fact.occurred_at().with_timezone(&self.offset);
        format!(
            "pada hari {}, tanggal {:02} {} {}, Jam {}",
            self.locale.weekday_name(local.weekday()),
            local.day(),
            self.locale.month_name(local.month()),
            local.year(),
            local.format("%H:%M")
        )
    }
}

impl Default for EventFormatter {
    fn default() -> Self {
        Self::new(MessageLocale::Indonesian, western_indonesia_time())
    }
}
