use chrono::Utc;
use log::info;
use rusqlite::Connection;

use crate::db::job::state::JobState;

pub fn update_state(conn: &Connection, id: i64, state: JobState) -> rusqlite::Result<()> {
    info!("Updating submission {id} with state {state}");
    conn.execute(
        "UPDATE submission SET state = ?1, updated_at = ?2 WHERE id = ?3",
        (state.as_str(), Utc::now().to_rfc3339(), id),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::job::load::{get_active_jobs, get_jobs};
    use crate::db::job::record::record_submission;
    use crate::db::open::{begin, open_in_memory, release_or_rollback};

    #[test]
    fn test_record_load_update() -> rusqlite::Result<()> {
        let conn = open_in_memory()?;
        let args = vec!["1000".to_string(), "2".to_string(), "500".to_string()];
        let ok = record_submission(&conn, 1000, "/alice/sim/run.jdl", &args, Some("123"))?;
        record_submission(&conn, 1001, "/alice/sim/run.jdl", &args, None)?;

        let jobs = get_jobs(&conn)?;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].arguments, "1000 2 500");
        assert_eq!(jobs[1].state, JobState::Failed);
        assert_eq!(get_active_jobs(&conn)?.len(), 1);

        update_state(&conn, ok, JobState::Done)?;
        assert!(get_active_jobs(&conn)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_dry_run_is_rolled_back() -> rusqlite::Result<()> {
        let conn = open_in_memory()?;
        begin(&conn)?;
        record_submission(&conn, 1000, "run.jdl", &[], Some("1"))?;
        release_or_rollback(&conn, true)?;
        assert!(get_jobs(&conn)?.is_empty());

        begin(&conn)?;
        record_submission(&conn, 1000, "run.jdl", &[], Some("1"))?;
        release_or_rollback(&conn, false)?;
        assert_eq!(get_jobs(&conn)?.len(), 1);
        Ok(())
    }
}
