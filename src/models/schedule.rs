// teamcal-service/src/models/schedule.rs
use crate::models::UserSummary;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// Canonical storage format for naive local times
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const ACCEPTED_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// Parse a naive local time string. A bare date means midnight of that day.
pub fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ACCEPTED_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

// Stored schedule row
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Schedule {
    pub id: i64,
    pub team_id: i64,
    pub creator_id: i64,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub all_day: bool,
    pub visibility: bool,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Join row between a schedule and a user, holding that user's private note
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScheduleParticipant {
    pub id: i64,
    pub schedule_id: i64,
    pub user_id: i64,
    pub personal_note: Option<String>,
}

// A schedule with everything the policies need already loaded
#[derive(Debug, Clone)]
pub struct LoadedSchedule {
    pub schedule: Schedule,
    pub creator: UserSummary,
    pub participants: Vec<ScheduleParticipant>,
}

impl LoadedSchedule {
    pub fn is_creator(&self, user_id: i64) -> bool {
        self.schedule.creator_id == user_id
    }

    pub fn participant(&self, user_id: i64) -> Option<&ScheduleParticipant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    pub fn is_participant(&self, user_id: i64) -> bool {
        self.participant(user_id).is_some()
    }

    pub fn member_ids(&self) -> Vec<i64> {
        self.participants.iter().map(|p| p.user_id).collect()
    }
}

// Core fields written to the schedules table
#[derive(Debug, Clone)]
pub struct ScheduleFields {
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub all_day: bool,
    pub visibility: bool,
    pub note: Option<String>,
}

// Body of POST /api/schedules and PATCH /api/schedules/{id}
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScheduleRequest {
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub all_day: Option<bool>,
    pub visibility: Option<bool>,
    pub note: Option<String>,
    pub personal_note: Option<String>,
    #[serde(default)]
    pub participants: Vec<i64>,
}

// Browser clients nest the fields under a `schedule` key; bare objects are accepted too
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ScheduleBody {
    Rooted { schedule: ScheduleRequest },
    Bare(ScheduleRequest),
}

impl ScheduleBody {
    pub fn into_inner(self) -> ScheduleRequest {
        match self {
            ScheduleBody::Rooted { schedule } => schedule,
            ScheduleBody::Bare(schedule) => schedule,
        }
    }
}

// What a given viewer is allowed to see of a schedule
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduleView {
    pub id: i64,
    pub title: String,
    pub note: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub all_day: bool,
    pub visibility: bool,
    pub members: Vec<i64>,
    pub creator: UserSummary,
    pub personal_note: Option<String>,
}

// Response for create/update
#[derive(Serialize, Deserialize, Debug)]
pub struct ScheduleDetail {
    pub message: String,
    pub schedule: ScheduleView,
    pub participants: Vec<UserSummary>,
    pub creator_personal_note: Option<String>,
}
