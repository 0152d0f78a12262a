// teamcal-service/src/policy/visibility.rs
// Decides which schedule fields a teammate may read.
//
// The viewer is assumed to be on the schedule's team; listing never loads
// other teams' schedules, so cross-team viewers do not reach this code.

use crate::models::{LoadedSchedule, ScheduleView};

/// Shown in place of both title and note of a private schedule.
pub const PRIVATE_SENTINEL: &str = "Private event";

/// Project a schedule for `viewer_id`.
///
/// Title and note are exposed when the schedule is public or the viewer is its
/// creator or a participant; otherwise both become [`PRIVATE_SENTINEL`].
/// `personal_note` is only ever the viewer's own participant note. Times,
/// flags, creator and the member id list are never redacted.
pub fn project(loaded: &LoadedSchedule, viewer_id: i64) -> ScheduleView {
    let schedule = &loaded.schedule;
    let is_creator = loaded.is_creator(viewer_id);
    let own_record = loaded.participant(viewer_id);
    let involved = is_creator || own_record.is_some();

    let (title, note) = if schedule.visibility || involved {
        (schedule.title.clone(), schedule.note.clone())
    } else {
        (
            PRIVATE_SENTINEL.to_string(),
            Some(PRIVATE_SENTINEL.to_string()),
        )
    };

    let personal_note = if involved {
        own_record.and_then(|p| p.personal_note.clone())
    } else {
        None
    };

    ScheduleView {
        id: schedule.id,
        title,
        note,
        start_time: schedule.start_time,
        end_time: schedule.end_time,
        all_day: schedule.all_day,
        visibility: schedule.visibility,
        members: loaded.member_ids(),
        creator: loaded.creator.clone(),
        personal_note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_local_time, Schedule, ScheduleParticipant, UserSummary};

    const CREATOR: i64 = 1;
    const PARTICIPANT: i64 = 2;
    const BYSTANDER: i64 = 3;

    fn loaded(visibility: bool) -> LoadedSchedule {
        let at = parse_local_time("2025-08-01T09:00").unwrap();
        LoadedSchedule {
            schedule: Schedule {
                id: 10,
                team_id: 1,
                creator_id: CREATOR,
                title: "Budget review".to_string(),
                start_time: at,
                end_time: parse_local_time("2025-08-01T10:00").unwrap(),
                all_day: false,
                visibility,
                note: Some("Room 4".to_string()),
                created_at: at,
                updated_at: at,
            },
            creator: UserSummary {
                id: CREATOR,
                name: "Aki".to_string(),
            },
            participants: vec![
                ScheduleParticipant {
                    id: 1,
                    schedule_id: 10,
                    user_id: CREATOR,
                    personal_note: Some("creator only".to_string()),
                },
                ScheduleParticipant {
                    id: 2,
                    schedule_id: 10,
                    user_id: PARTICIPANT,
                    personal_note: Some("participant only".to_string()),
                },
            ],
        }
    }

    #[test]
    fn private_schedule_is_redacted_for_bystanders() {
        let view = project(&loaded(false), BYSTANDER);
        assert_eq!(view.title, PRIVATE_SENTINEL);
        assert_eq!(view.note.as_deref(), Some(PRIVATE_SENTINEL));
        assert_eq!(view.personal_note, None);
        assert_eq!(view.members, vec![CREATOR, PARTICIPANT]);
        assert_eq!(view.creator.name, "Aki");
        assert!(!view.visibility);
    }

    #[test]
    fn public_schedule_shows_details_but_not_notes_of_others() {
        let view = project(&loaded(true), BYSTANDER);
        assert_eq!(view.title, "Budget review");
        assert_eq!(view.note.as_deref(), Some("Room 4"));
        assert_eq!(view.personal_note, None);
    }

    #[test]
    fn each_involved_viewer_sees_only_their_own_note() {
        for visibility in [true, false] {
            let schedule = loaded(visibility);

            let creator_view = project(&schedule, CREATOR);
            assert_eq!(creator_view.title, "Budget review");
            assert_eq!(creator_view.personal_note.as_deref(), Some("creator only"));

            let participant_view = project(&schedule, PARTICIPANT);
            assert_eq!(participant_view.note.as_deref(), Some("Room 4"));
            assert_eq!(
                participant_view.personal_note.as_deref(),
                Some("participant only")
            );
        }
    }

    #[test]
    fn creator_without_participant_row_has_no_personal_note() {
        let mut schedule = loaded(false);
        schedule.participants.retain(|p| p.user_id != CREATOR);

        let view = project(&schedule, CREATOR);
        assert_eq!(view.title, "Budget review");
        assert_eq!(view.personal_note, None);
        assert_eq!(view.members, vec![PARTICIPANT]);
    }
}
