//! SQLite-backed status store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::episode::EpisodeDescriptor;
use crate::store::{
    Artifact, ArtifactKind, ArtifactPatch, ArtifactStatus, RunPatch, RunStatus, StatusStore,
    StoreError, TriggerType, Visibility, WorkflowRun,
};

const RUN_COLUMNS: &str = "run_id, status, trigger_type, main_category, sub_category, episode, \
     triggered_at, original_trigger_date, last_stage, last_stage_status, error, updated_at";

const ARTIFACT_COLUMNS: &str = "artifact_id, run_id, kind, title, description, visibility, \
     status, upload_date, watch_url, published_at, cross_link_url, scheduled_slot, error, \
     updated_at";

/// SQLite-backed status store.
pub struct SqliteStatusStore {
    conn: Mutex<Connection>,
}

impl SqliteStatusStore {
    /// Open a status store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory status store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                run_id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                trigger_type TEXT NOT NULL,
                main_category TEXT NOT NULL,
                sub_category TEXT NOT NULL,
                episode INTEGER NOT NULL,
                triggered_at TEXT NOT NULL,
                original_trigger_date TEXT,
                last_stage TEXT,
                last_stage_status TEXT,
                error TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_runs_triggered_at ON runs(triggered_at);
            CREATE INDEX IF NOT EXISTS idx_runs_original_date ON runs(original_trigger_date);

            CREATE TABLE IF NOT EXISTS artifacts (
                artifact_id TEXT PRIMARY KEY,
                run_id TEXT,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                visibility TEXT NOT NULL,
                status TEXT NOT NULL,
                upload_date TEXT NOT NULL,
                watch_url TEXT,
                published_at TEXT,
                cross_link_url TEXT,
                scheduled_slot TEXT,
                error TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_artifacts_upload_date ON artifacts(upload_date);
            CREATE INDEX IF NOT EXISTS idx_artifacts_kind ON artifacts(kind);

            CREATE TABLE IF NOT EXISTS episodes (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                main_category TEXT NOT NULL,
                sub_category TEXT NOT NULL,
                episode INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_run(row: &rusqlite::Row) -> rusqlite::Result<WorkflowRun> {
        let run_id: String = row.get(0)?;
        let status_str: String = row.get(1)?;
        let trigger_type_str: String = row.get(2)?;
        let main_category: String = row.get(3)?;
        let sub_category: String = row.get(4)?;
        let episode: u32 = row.get(5)?;
        let triggered_at_str: String = row.get(6)?;
        let original_date_str: Option<String> = row.get(7)?;
        let last_stage: Option<String> = row.get(8)?;
        let last_stage_status: Option<String> = row.get(9)?;
        let error: Option<String> = row.get(10)?;
        let updated_at_str: String = row.get(11)?;

        Ok(WorkflowRun {
            run_id,
            status: RunStatus::parse(&status_str)
                .ok_or_else(|| corrupt_column(1, format!("unknown run status '{status_str}'")))?,
            trigger_type: TriggerType::parse(&trigger_type_str).ok_or_else(|| {
                corrupt_column(2, format!("unknown trigger type '{trigger_type_str}'"))
            })?,
            descriptor: EpisodeDescriptor::new(main_category, sub_category, episode),
            triggered_at: parse_timestamp(6, &triggered_at_str)?,
            original_trigger_date: original_date_str
                .map(|s| {
                    s.parse()
                        .map_err(|e| corrupt_column(7, format!("bad date '{s}': {e}")))
                })
                .transpose()?,
            last_stage,
            last_stage_status,
            error,
            updated_at: parse_timestamp(11, &updated_at_str)?,
        })
    }

    fn row_to_artifact(row: &rusqlite::Row) -> rusqlite::Result<Artifact> {
        let artifact_id: String = row.get(0)?;
        let run_id: Option<String> = row.get(1)?;
        let kind_str: String = row.get(2)?;
        let title: String = row.get(3)?;
        let description: String = row.get(4)?;
        let visibility_str: String = row.get(5)?;
        let status_str: String = row.get(6)?;
        let upload_date_str: String = row.get(7)?;
        let watch_url: Option<String> = row.get(8)?;
        let published_at_str: Option<String> = row.get(9)?;
        let cross_link_url: Option<String> = row.get(10)?;
        let scheduled_slot: Option<String> = row.get(11)?;
        let error: Option<String> = row.get(12)?;
        let updated_at_str: String = row.get(13)?;

        Ok(Artifact {
            artifact_id,
            run_id,
            kind: ArtifactKind::parse(&kind_str)
                .ok_or_else(|| corrupt_column(2, format!("unknown artifact kind '{kind_str}'")))?,
            title,
            description,
            visibility: Visibility::parse(&visibility_str).ok_or_else(|| {
                corrupt_column(5, format!("unknown visibility '{visibility_str}'"))
            })?,
            status: ArtifactStatus::parse(&status_str).ok_or_else(|| {
                corrupt_column(6, format!("unknown artifact status '{status_str}'"))
            })?,
            upload_date: upload_date_str.parse().map_err(|e| {
                corrupt_column(7, format!("bad upload date '{upload_date_str}': {e}"))
            })?,
            watch_url,
            published_at: published_at_str
                .map(|s| parse_timestamp(9, &s))
                .transpose()?,
            cross_link_url,
            scheduled_slot,
            error,
            updated_at: parse_timestamp(13, &updated_at_str)?,
        })
    }

    fn get_run_locked(
        conn: &Connection,
        run_id: &str,
    ) -> Result<Option<WorkflowRun>, StoreError> {
        conn.query_row(
            &format!("SELECT {RUN_COLUMNS} FROM runs WHERE run_id = ?"),
            params![run_id],
            Self::row_to_run,
        )
        .optional()
        .map_err(StoreError::from)
    }

    fn get_artifact_locked(
        conn: &Connection,
        artifact_id: &str,
    ) -> Result<Option<Artifact>, StoreError> {
        conn.query_row(
            &format!("SELECT {ARTIFACT_COLUMNS} FROM artifacts WHERE artifact_id = ?"),
            params![artifact_id],
            Self::row_to_artifact,
        )
        .optional()
        .map_err(StoreError::from)
    }
}

// Corrupt rows surface as errors instead of reading back with
// plausible defaults.
fn corrupt_column(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, message.into())
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt_column(idx, format!("bad timestamp '{s}': {e}")))
}

fn required<T>(value: Option<T>, id: &str, field: &'static str) -> Result<T, StoreError> {
    value.ok_or_else(|| StoreError::Incomplete {
        id: id.to_string(),
        field,
    })
}

impl StatusStore for SqliteStatusStore {
    fn latest_episode(&self) -> Result<Option<EpisodeDescriptor>, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT main_category, sub_category, episode FROM episodes ORDER BY seq DESC LIMIT 1",
            [],
            |row| {
                Ok(EpisodeDescriptor::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                ))
            },
        )
        .optional()
        .map_err(StoreError::from)
    }

    fn record_episode(&self, descriptor: &EpisodeDescriptor) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO episodes (main_category, sub_category, episode, recorded_at) VALUES (?, ?, ?, ?)",
            params![
                descriptor.main_category,
                descriptor.sub_category,
                descriptor.episode,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn upsert_run(&self, patch: RunPatch) -> Result<WorkflowRun, StoreError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let existing = Self::get_run_locked(&conn, &patch.run_id)?;
        match existing {
            None => {
                let status = required(patch.status, &patch.run_id, "status")?;
                let trigger_type = required(patch.trigger_type, &patch.run_id, "trigger_type")?;
                let descriptor = required(patch.descriptor, &patch.run_id, "descriptor")?;
                let triggered_at = patch.triggered_at.unwrap_or(now);

                conn.execute(
                    &format!(
                        "INSERT INTO runs ({RUN_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
                    ),
                    params![
                        patch.run_id,
                        status.as_str(),
                        trigger_type.as_str(),
                        descriptor.main_category,
                        descriptor.sub_category,
                        descriptor.episode,
                        triggered_at.to_rfc3339(),
                        patch.original_trigger_date.map(|d| d.to_string()),
                        patch.last_stage,
                        patch.last_stage_status,
                        patch.error,
                        now.to_rfc3339(),
                    ],
                )?;
            }
            Some(_) => {
                // Unset patch fields keep their stored value.
                conn.execute(
                    "UPDATE runs SET \
                         status = COALESCE(?2, status), \
                         trigger_type = COALESCE(?3, trigger_type), \
                         main_category = COALESCE(?4, main_category), \
                         sub_category = COALESCE(?5, sub_category), \
                         episode = COALESCE(?6, episode), \
                         triggered_at = COALESCE(?7, triggered_at), \
                         original_trigger_date = COALESCE(?8, original_trigger_date), \
                         last_stage = COALESCE(?9, last_stage), \
                         last_stage_status = COALESCE(?10, last_stage_status), \
                         error = COALESCE(?11, error), \
                         updated_at = ?12 \
                     WHERE run_id = ?1",
                    params![
                        patch.run_id,
                        patch.status.map(|s| s.as_str()),
                        patch.trigger_type.map(|t| t.as_str()),
                        patch.descriptor.as_ref().map(|d| d.main_category.clone()),
                        patch.descriptor.as_ref().map(|d| d.sub_category.clone()),
                        patch.descriptor.as_ref().map(|d| d.episode),
                        patch.triggered_at.map(|t| t.to_rfc3339()),
                        patch.original_trigger_date.map(|d| d.to_string()),
                        patch.last_stage,
                        patch.last_stage_status,
                        patch.error,
                        now.to_rfc3339(),
                    ],
                )?;
            }
        }

        Self::get_run_locked(&conn, &patch.run_id)?
            .ok_or_else(|| StoreError::NotFound(patch.run_id))
    }

    fn get_run(&self, run_id: &str) -> Result<Option<WorkflowRun>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::get_run_locked(&conn, run_id)
    }

    fn run_for_date(&self, date: NaiveDate) -> Result<Option<WorkflowRun>, StoreError> {
        let conn = self.conn.lock().unwrap();
        // RFC 3339 timestamps in UTC sort lexicographically, so a
        // half-open day window is a plain string range.
        let start = format!("{date}T00:00:00");
        let end = format!("{}T00:00:00", date.succ_opt().unwrap_or(date));
        conn.query_row(
            &format!(
                "SELECT {RUN_COLUMNS} FROM runs \
                 WHERE triggered_at >= ? AND triggered_at < ? \
                 ORDER BY triggered_at DESC LIMIT 1"
            ),
            params![start, end],
            Self::row_to_run,
        )
        .optional()
        .map_err(StoreError::from)
    }

    fn count_backup_runs(&self, original_date: NaiveDate) -> Result<u32, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM runs WHERE trigger_type = 'backup' AND original_trigger_date = ?",
            params![original_date.to_string()],
            |row| row.get(0),
        )
        .map_err(StoreError::from)
    }

    fn recent_runs(&self, limit: u32) -> Result<Vec<WorkflowRun>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RUN_COLUMNS} FROM runs ORDER BY triggered_at DESC LIMIT ?"
        ))?;
        let rows = stmt.query_map(params![limit], Self::row_to_run)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)
    }

    fn upsert_artifact(&self, patch: ArtifactPatch) -> Result<Artifact, StoreError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let existing = Self::get_artifact_locked(&conn, &patch.artifact_id)?;
        match existing {
            None => {
                let kind = required(patch.kind, &patch.artifact_id, "kind")?;
                let title = required(patch.title, &patch.artifact_id, "title")?;
                let visibility = patch.visibility.unwrap_or(Visibility::Unlisted);
                let status = patch.status.unwrap_or(ArtifactStatus::Uploaded);
                let upload_date = patch.upload_date.unwrap_or_else(|| now.date_naive());

                conn.execute(
                    &format!(
                        "INSERT INTO artifacts ({ARTIFACT_COLUMNS}) \
                         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
                    ),
                    params![
                        patch.artifact_id,
                        patch.run_id,
                        kind.as_str(),
                        title,
                        patch.description.unwrap_or_default(),
                        visibility.as_str(),
                        status.as_str(),
                        upload_date.to_string(),
                        patch.watch_url,
                        patch.published_at.map(|t| t.to_rfc3339()),
                        patch.cross_link_url,
                        patch.scheduled_slot,
                        patch.error,
                        now.to_rfc3339(),
                    ],
                )?;
            }
            Some(_) => {
                conn.execute(
                    "UPDATE artifacts SET \
                         run_id = COALESCE(?2, run_id), \
                         kind = COALESCE(?3, kind), \
                         title = COALESCE(?4, title), \
                         description = COALESCE(?5, description), \
                         visibility = COALESCE(?6, visibility), \
                         status = COALESCE(?7, status), \
                         upload_date = COALESCE(?8, upload_date), \
                         watch_url = COALESCE(?9, watch_url), \
                         published_at = COALESCE(?10, published_at), \
                         cross_link_url = COALESCE(?11, cross_link_url), \
                         scheduled_slot = COALESCE(?12, scheduled_slot), \
                         error = COALESCE(?13, error), \
                         updated_at = ?14 \
                     WHERE artifact_id = ?1",
                    params![
                        patch.artifact_id,
                        patch.run_id,
                        patch.kind.map(|k| k.as_str()),
                        patch.title,
                        patch.description,
                        patch.visibility.map(|v| v.as_str()),
                        patch.status.map(|s| s.as_str()),
                        patch.upload_date.map(|d| d.to_string()),
                        patch.watch_url,
                        patch.published_at.map(|t| t.to_rfc3339()),
                        patch.cross_link_url,
                        patch.scheduled_slot,
                        patch.error,
                        now.to_rfc3339(),
                    ],
                )?;
            }
        }

        Self::get_artifact_locked(&conn, &patch.artifact_id)?
            .ok_or_else(|| StoreError::NotFound(patch.artifact_id))
    }

    fn get_artifact(&self, artifact_id: &str) -> Result<Option<Artifact>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::get_artifact_locked(&conn, artifact_id)
    }

    fn artifacts_by_date(
        &self,
        date: NaiveDate,
        kind: Option<ArtifactKind>,
    ) -> Result<Vec<Artifact>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let rows = match kind {
            Some(kind) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTIFACT_COLUMNS} FROM artifacts \
                     WHERE upload_date = ? AND kind = ? ORDER BY updated_at ASC"
                ))?;
                let rows = stmt.query_map(
                    params![date.to_string(), kind.as_str()],
                    Self::row_to_artifact,
                )?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTIFACT_COLUMNS} FROM artifacts \
                     WHERE upload_date = ? ORDER BY updated_at ASC"
                ))?;
                let rows = stmt.query_map(params![date.to_string()], Self::row_to_artifact)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(rows)
    }

    fn recent_artifacts(&self, limit: u32) -> Result<Vec<Artifact>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts ORDER BY updated_at DESC, artifact_id DESC LIMIT ?"
        ))?;
        let rows = stmt.query_map(params![limit], Self::row_to_artifact)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn descriptor() -> EpisodeDescriptor {
        EpisodeDescriptor::new("history", "ancient-rome", 3)
    }

    fn insert_run(store: &SqliteStatusStore, run_id: &str, at: DateTime<Utc>) -> WorkflowRun {
        store
            .upsert_run(
                RunPatch::new(run_id)
                    .status(RunStatus::Triggered)
                    .trigger_type(TriggerType::Main)
                    .descriptor(descriptor())
                    .triggered_at(at),
            )
            .unwrap()
    }

    #[test]
    fn test_episode_history_starts_empty() {
        let store = SqliteStatusStore::in_memory().unwrap();
        assert_eq!(store.latest_episode().unwrap(), None);
    }

    #[test]
    fn test_latest_episode_is_last_recorded() {
        let store = SqliteStatusStore::in_memory().unwrap();
        store
            .record_episode(&EpisodeDescriptor::new("history", "ancient-rome", 1))
            .unwrap();
        store
            .record_episode(&EpisodeDescriptor::new("history", "ancient-rome", 2))
            .unwrap();

        let latest = store.latest_episode().unwrap().unwrap();
        assert_eq!(latest.episode, 2);
    }

    #[test]
    fn test_upsert_run_creates_and_reads_back() {
        let store = SqliteStatusStore::in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 0, 5, 0).unwrap();
        let run = insert_run(&store, "run_a", at);

        assert_eq!(run.status, RunStatus::Triggered);
        assert_eq!(run.descriptor, descriptor());
        assert_eq!(run.triggered_at, at);

        let fetched = store.get_run("run_a").unwrap().unwrap();
        assert_eq!(fetched, run);
    }

    #[test]
    fn test_upsert_run_rejects_incomplete_new_row() {
        let store = SqliteStatusStore::in_memory().unwrap();
        let err = store
            .upsert_run(RunPatch::new("run_x").status(RunStatus::Triggered))
            .unwrap_err();
        assert!(matches!(err, StoreError::Incomplete { .. }));
    }

    #[test]
    fn test_run_patch_merges_without_clobbering() {
        let store = SqliteStatusStore::in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 0, 5, 0).unwrap();
        insert_run(&store, "run_a", at);

        // A stage update must not touch status or descriptor.
        let merged = store
            .upsert_run(RunPatch::new("run_a").stage("video_rendered", "completed"))
            .unwrap();
        assert_eq!(merged.status, RunStatus::Triggered);
        assert_eq!(merged.descriptor, descriptor());
        assert_eq!(merged.last_stage.as_deref(), Some("video_rendered"));

        // A status update must not touch the recorded stage.
        let merged = store
            .upsert_run(RunPatch::new("run_a").status(RunStatus::Uploaded))
            .unwrap();
        assert_eq!(merged.status, RunStatus::Uploaded);
        assert_eq!(merged.last_stage.as_deref(), Some("video_rendered"));
    }

    #[test]
    fn test_run_for_date_picks_latest_of_day() {
        let store = SqliteStatusStore::in_memory().unwrap();
        insert_run(
            &store,
            "run_main",
            Utc.with_ymd_and_hms(2026, 3, 14, 0, 5, 0).unwrap(),
        );
        insert_run(
            &store,
            "run_late",
            Utc.with_ymd_and_hms(2026, 3, 14, 4, 0, 0).unwrap(),
        );
        insert_run(
            &store,
            "run_next_day",
            Utc.with_ymd_and_hms(2026, 3, 15, 0, 5, 0).unwrap(),
        );

        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let run = store.run_for_date(date).unwrap().unwrap();
        assert_eq!(run.run_id, "run_late");

        let empty = NaiveDate::from_ymd_opt(2026, 3, 13).unwrap();
        assert!(store.run_for_date(empty).unwrap().is_none());
    }

    #[test]
    fn test_count_backup_runs_by_original_date() {
        let store = SqliteStatusStore::in_memory().unwrap();
        let original = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(store.count_backup_runs(original).unwrap(), 0);

        store
            .upsert_run(
                RunPatch::new("run_backup")
                    .status(RunStatus::BackupTriggered)
                    .trigger_type(TriggerType::Backup)
                    .descriptor(descriptor())
                    .triggered_at(Utc.with_ymd_and_hms(2026, 3, 15, 4, 0, 0).unwrap())
                    .original_trigger_date(original),
            )
            .unwrap();

        assert_eq!(store.count_backup_runs(original).unwrap(), 1);
        let other = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(store.count_backup_runs(other).unwrap(), 0);
    }

    #[test]
    fn test_artifact_upsert_defaults_and_merge() {
        let store = SqliteStatusStore::in_memory().unwrap();
        let created = store
            .upsert_artifact(
                ArtifactPatch::new("vid_1")
                    .kind(ArtifactKind::Primary)
                    .title("Ancient Rome, part 3")
                    .description("A deep dive.")
                    .upload_date(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()),
            )
            .unwrap();
        assert_eq!(created.visibility, Visibility::Unlisted);
        assert_eq!(created.status, ArtifactStatus::Uploaded);

        let published_at = Utc.with_ymd_and_hms(2026, 3, 14, 17, 0, 2).unwrap();
        let merged = store
            .upsert_artifact(
                ArtifactPatch::new("vid_1")
                    .visibility(Visibility::Public)
                    .status(ArtifactStatus::Published)
                    .published_at(published_at),
            )
            .unwrap();
        assert_eq!(merged.title, "Ancient Rome, part 3");
        assert_eq!(merged.description, "A deep dive.");
        assert_eq!(merged.status, ArtifactStatus::Published);
        assert_eq!(merged.published_at, Some(published_at));
    }

    #[test]
    fn test_artifact_upsert_rejects_untitled_new_row() {
        let store = SqliteStatusStore::in_memory().unwrap();
        let err = store
            .upsert_artifact(ArtifactPatch::new("vid_x").kind(ArtifactKind::Primary))
            .unwrap_err();
        assert!(matches!(err, StoreError::Incomplete { field: "title", .. }));
    }

    #[test]
    fn test_artifacts_by_date_filters_kind() {
        let store = SqliteStatusStore::in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        for (id, kind) in [
            ("vid_long", ArtifactKind::Primary),
            ("vid_short", ArtifactKind::Secondary),
        ] {
            store
                .upsert_artifact(
                    ArtifactPatch::new(id)
                        .kind(kind)
                        .title(id)
                        .upload_date(date),
                )
                .unwrap();
        }

        let all = store.artifacts_by_date(date, None).unwrap();
        assert_eq!(all.len(), 2);

        let primary = store
            .artifacts_by_date(date, Some(ArtifactKind::Primary))
            .unwrap();
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].artifact_id, "vid_long");

        let other = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert!(store.artifacts_by_date(other, None).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_run_status_surfaces_error() {
        let store = SqliteStatusStore::in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 0, 5, 0).unwrap();
        insert_run(&store, "run_a", at);
        {
            let conn = store.conn.lock().unwrap();
            conn.execute("UPDATE runs SET status = 'exploded' WHERE run_id = 'run_a'", [])
                .unwrap();
        }

        let err = store.get_run("run_a").unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_corrupt_run_timestamp_surfaces_error() {
        let store = SqliteStatusStore::in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 0, 5, 0).unwrap();
        insert_run(&store, "run_a", at);
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "UPDATE runs SET triggered_at = 'yesterday-ish' WHERE run_id = 'run_a'",
                [],
            )
            .unwrap();
        }

        let err = store.get_run("run_a").unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_corrupt_artifact_kind_surfaces_error() {
        let store = SqliteStatusStore::in_memory().unwrap();
        store
            .upsert_artifact(
                ArtifactPatch::new("vid_1")
                    .kind(ArtifactKind::Primary)
                    .title("Ancient Rome, part 3"),
            )
            .unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "UPDATE artifacts SET kind = 'hologram' WHERE artifact_id = 'vid_1'",
                [],
            )
            .unwrap();
        }

        let err = store.get_artifact("vid_1").unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.db");

        {
            let store = SqliteStatusStore::new(&path).unwrap();
            insert_run(
                &store,
                "run_a",
                Utc.with_ymd_and_hms(2026, 3, 14, 0, 5, 0).unwrap(),
            );
            store.record_episode(&descriptor()).unwrap();
        }

        let store = SqliteStatusStore::new(&path).unwrap();
        assert!(store.get_run("run_a").unwrap().is_some());
        assert_eq!(store.latest_episode().unwrap(), Some(descriptor()));
    }
}
