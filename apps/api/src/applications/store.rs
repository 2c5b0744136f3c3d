//! Transactional data access for the application workflows.
//!
//! `HrStore` is the seam between the workflows (submission, hire, bulk) and
//! PostgreSQL. `PgHrStore` runs every call on one connection, usually an open
//! transaction, so a workflow's writes commit or roll back together.

use std::ops::DerefMut;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::applications::status::ApplicationStatus;
use crate::errors::AppError;
use crate::models::application::{ApplicationRef, NewApplication};
use crate::models::job::JobPositionRow;
use crate::models::onboarding::RequiredDocument;

/// Department value on templates that apply to every department.
pub const ALL_DEPARTMENTS: &str = "ALL";

const SAVEPOINT_SQL: &str = "SAVEPOINT bulk_item";
const RELEASE_SAVEPOINT_SQL: &str = "RELEASE SAVEPOINT bulk_item";
const ROLLBACK_TO_SAVEPOINT_SQL: &str = "ROLLBACK TO SAVEPOINT bulk_item";

/// Only candidates and already-converted employees can be promoted.
const PROMOTE_SQL: &str = r#"
    UPDATE users
    SET role = 'employee', department = $1, job_position_id = $2, updated_at = NOW()
    WHERE id = $3 AND role IN ('candidate', 'employee')
"#;

const ASSIGN_ONBOARDING_SQL: &str = r#"
    INSERT INTO employee_onboarding (id, employee_id, task_id, status)
    SELECT gen_random_uuid(), $1, t.id, 'pending'
    FROM onboarding_tasks t
    WHERE t.department = $2 OR t.department = $3
    ON CONFLICT (employee_id, task_id) DO NOTHING
"#;

const ASSIGN_TRAINING_SQL: &str = r#"
    INSERT INTO employee_training (id, employee_id, module_id, status, progress_percentage)
    SELECT gen_random_uuid(), $1, m.id, 'not_started', 0
    FROM training_modules m
    WHERE m.department = $2 OR m.department = $3
    ON CONFLICT (employee_id, module_id) DO NOTHING
"#;

const ENSURE_DOCUMENT_SQL: &str = r#"
    INSERT INTO employee_documents
        (id, employee_id, document_type, document_name, status, is_required)
    VALUES ($1, $2, $3, $4, 'pending', TRUE)
    ON CONFLICT (employee_id, document_type) DO NOTHING
"#;

#[async_trait]
pub trait HrStore: Send {
    async fn application(&mut self, id: Uuid) -> Result<Option<ApplicationRef>, AppError>;

    async fn application_exists(
        &mut self,
        candidate_id: Uuid,
        job_position_id: Uuid,
    ) -> Result<bool, AppError>;

    /// Inserts a new `pending` application. A concurrent duplicate surfaces as
    /// `AppError::Conflict`.
    async fn insert_application(&mut self, new: &NewApplication) -> Result<Uuid, AppError>;

    /// Writes status, notes (when given) and `updated_at`. Returns false when
    /// no row matched.
    async fn set_application_status(
        &mut self,
        id: Uuid,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<bool, AppError>;

    async fn job_position(&mut self, id: Uuid) -> Result<Option<JobPositionRow>, AppError>;

    /// Flips a candidate (or an already-converted employee) to `employee`.
    /// Refuses any other role.
    async fn promote_to_employee(
        &mut self,
        user_id: Uuid,
        department: &str,
        job_position_id: Uuid,
    ) -> Result<(), AppError>;

    /// Insert-if-absent assignments for templates scoped to `department` or ALL.
    async fn assign_onboarding_tasks(
        &mut self,
        employee_id: Uuid,
        department: &str,
    ) -> Result<u64, AppError>;

    async fn assign_training_modules(
        &mut self,
        employee_id: Uuid,
        department: &str,
    ) -> Result<u64, AppError>;

    async fn ensure_required_documents(
        &mut self,
        employee_id: Uuid,
        documents: &[RequiredDocument],
    ) -> Result<u64, AppError>;

    /// Savepoints isolate one item of a batch inside the outer transaction.
    async fn savepoint(&mut self) -> Result<(), AppError>;

    async fn release_savepoint(&mut self) -> Result<(), AppError>;

    async fn rollback_to_savepoint(&mut self) -> Result<(), AppError>;
}

/// PostgreSQL-backed store over a single connection.
pub struct PgHrStore<C> {
    conn: C,
}

pub type PgHrTx = PgHrStore<Transaction<'static, Postgres>>;

impl PgHrStore<Transaction<'static, Postgres>> {
    pub async fn begin(pool: &PgPool) -> Result<Self, AppError> {
        Ok(Self {
            conn: pool.begin().await?,
        })
    }

    pub async fn commit(self) -> Result<(), AppError> {
        self.conn.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), AppError> {
        self.conn.rollback().await?;
        Ok(())
    }
}

impl PgHrStore<PoolConnection<Postgres>> {
    /// A plain pooled connection; each statement commits on its own.
    pub async fn acquire(pool: &PgPool) -> Result<Self, AppError> {
        Ok(Self {
            conn: pool.acquire().await?,
        })
    }
}

#[async_trait]
impl<C> HrStore for PgHrStore<C>
where
    C: DerefMut<Target = PgConnection> + Send,
{
    async fn application(&mut self, id: Uuid) -> Result<Option<ApplicationRef>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationRef>(
            "SELECT id, candidate_id, job_position_id, status FROM applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?)
    }

    async fn application_exists(
        &mut self,
        candidate_id: Uuid,
        job_position_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE candidate_id = $1 AND job_position_id = $2)",
        )
        .bind(candidate_id)
        .bind(job_position_id)
        .fetch_one(&mut *self.conn)
        .await?)
    }

    async fn insert_application(&mut self, new: &NewApplication) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let result = sqlx::query(
            r#"
            INSERT INTO applications
                (id, candidate_id, job_position_id, resume_filename, resume_path,
                 api_response, extracted_skills, extracted_experience,
                 extracted_education, extracted_contact, match_percentage, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending')
            "#,
        )
        .bind(id)
        .bind(new.candidate_id)
        .bind(new.job_position_id)
        .bind(&new.resume_filename)
        .bind(&new.resume_path)
        .bind(&new.api_response)
        .bind(&new.extracted_skills)
        .bind(&new.extracted_experience)
        .bind(&new.extracted_education)
        .bind(&new.extracted_contact)
        .bind(new.match_percentage)
        .execute(&mut *self.conn)
        .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                AppError::Conflict("You have already applied for this position".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_application_status(
        &mut self,
        id: Uuid,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $1, hr_notes = COALESCE($2, hr_notes), updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(notes)
        .bind(id)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn job_position(&mut self, id: Uuid) -> Result<Option<JobPositionRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobPositionRow>("SELECT * FROM job_positions WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.conn)
                .await?,
        )
    }

    async fn promote_to_employee(
        &mut self,
        user_id: Uuid,
        department: &str,
        job_position_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query(PROMOTE_SQL)
            .bind(department)
            .bind(job_position_id)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Validation(format!(
                "User {user_id} is not a candidate and cannot be hired"
            )));
        }
        Ok(())
    }

    async fn assign_onboarding_tasks(
        &mut self,
        employee_id: Uuid,
        department: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(ASSIGN_ONBOARDING_SQL)
            .bind(employee_id)
            .bind(department)
            .bind(ALL_DEPARTMENTS)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn assign_training_modules(
        &mut self,
        employee_id: Uuid,
        department: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(ASSIGN_TRAINING_SQL)
            .bind(employee_id)
            .bind(department)
            .bind(ALL_DEPARTMENTS)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ensure_required_documents(
        &mut self,
        employee_id: Uuid,
        documents: &[RequiredDocument],
    ) -> Result<u64, AppError> {
        let mut inserted = 0;
        for doc in documents {
            let result = sqlx::query(ENSURE_DOCUMENT_SQL)
                .bind(Uuid::new_v4())
                .bind(employee_id)
                .bind(doc.document_type)
                .bind(doc.document_name)
                .execute(&mut *self.conn)
                .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn savepoint(&mut self) -> Result<(), AppError> {
        sqlx::query(SAVEPOINT_SQL).execute(&mut *self.conn).await?;
        Ok(())
    }

    async fn release_savepoint(&mut self) -> Result<(), AppError> {
        sqlx::query(RELEASE_SAVEPOINT_SQL).execute(&mut *self.conn).await?;
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self) -> Result<(), AppError> {
        sqlx::query(ROLLBACK_TO_SAVEPOINT_SQL)
            .execute(&mut *self.conn)
            .await?;
        // ROLLBACK TO keeps the savepoint alive; drop it so the next item starts clean.
        self.release_savepoint().await
    }
}

/// In-memory `HrStore` with commit/rollback semantics, for workflow tests.
#[cfg(test)]
pub mod memory {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use super::*;
    use crate::models::user::UserRole;

    #[derive(Debug, Clone)]
    pub struct MemUser {
        pub role: UserRole,
        pub department: Option<String>,
        pub job_position_id: Option<Uuid>,
    }

    #[derive(Debug, Clone)]
    pub struct MemApplication {
        pub candidate_id: Uuid,
        pub job_position_id: Uuid,
        pub status: ApplicationStatus,
        pub hr_notes: Option<String>,
        pub match_percentage: f64,
    }

    #[derive(Debug, Clone, Default)]
    pub struct MemoryData {
        pub users: HashMap<Uuid, MemUser>,
        pub jobs: HashMap<Uuid, JobPositionRow>,
        pub applications: HashMap<Uuid, MemApplication>,
        pub onboarding_templates: Vec<(Uuid, String)>,
        pub training_templates: Vec<(Uuid, String)>,
        /// (employee_id, task_id) rows; a Vec so duplicates would be visible.
        pub onboarding: Vec<(Uuid, Uuid)>,
        pub training: Vec<(Uuid, Uuid)>,
        pub documents: Vec<(Uuid, String)>,
    }

    /// Committed state shared between transactions.
    #[derive(Clone, Default)]
    pub struct MemoryDb {
        data: Arc<Mutex<MemoryData>>,
    }

    impl MemoryDb {
        pub fn snapshot(&self) -> MemoryData {
            self.data.lock().unwrap().clone()
        }

        pub fn begin(&self) -> MemoryTx {
            MemoryTx {
                db: self.data.clone(),
                work: self.snapshot(),
                savepoints: Vec::new(),
                fail_promote: false,
                fail_status_for: HashSet::new(),
                fail_job_lookup: false,
            }
        }

        pub fn add_user(&self, role: UserRole) -> Uuid {
            let id = Uuid::new_v4();
            self.data.lock().unwrap().users.insert(
                id,
                MemUser {
                    role,
                    department: None,
                    job_position_id: None,
                },
            );
            id
        }

        pub fn add_job(&self, title: &str, department: &str, skills: &str, level: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.data.lock().unwrap().jobs.insert(
                id,
                JobPositionRow {
                    id,
                    title: title.to_string(),
                    department: department.to_string(),
                    description: String::new(),
                    required_skills: skills.to_string(),
                    experience_level: level.to_string(),
                    status: "active".to_string(),
                    created_by: Uuid::nil(),
                    created_at: Utc::now(),
                },
            );
            id
        }

        pub fn close_job(&self, id: Uuid) {
            if let Some(job) = self.data.lock().unwrap().jobs.get_mut(&id) {
                job.status = "closed".to_string();
            }
        }

        pub fn add_application(
            &self,
            candidate_id: Uuid,
            job_position_id: Uuid,
            status: ApplicationStatus,
        ) -> Uuid {
            let id = Uuid::new_v4();
            self.data.lock().unwrap().applications.insert(
                id,
                MemApplication {
                    candidate_id,
                    job_position_id,
                    status,
                    hr_notes: None,
                    match_percentage: 0.0,
                },
            );
            id
        }

        pub fn add_onboarding_template(&self, department: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.data
                .lock()
                .unwrap()
                .onboarding_templates
                .push((id, department.to_string()));
            id
        }

        pub fn add_training_template(&self, department: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.data
                .lock()
                .unwrap()
                .training_templates
                .push((id, department.to_string()));
            id
        }
    }

    /// A unit of work over a private copy of the data. `commit` publishes it;
    /// dropping it discards it.
    pub struct MemoryTx {
        db: Arc<Mutex<MemoryData>>,
        work: MemoryData,
        savepoints: Vec<MemoryData>,
        pub fail_promote: bool,
        pub fail_status_for: HashSet<Uuid>,
        pub fail_job_lookup: bool,
    }

    impl MemoryTx {
        pub fn commit(self) {
            *self.db.lock().unwrap() = self.work;
        }
    }

    fn simulated(what: &str) -> AppError {
        AppError::Internal(anyhow::anyhow!("simulated failure: {what}"))
    }

    fn scoped(department: &str, template_department: &str) -> bool {
        template_department == department || template_department == ALL_DEPARTMENTS
    }

    #[async_trait]
    impl HrStore for MemoryTx {
        async fn application(&mut self, id: Uuid) -> Result<Option<ApplicationRef>, AppError> {
            Ok(self.work.applications.get(&id).map(|a| ApplicationRef {
                id,
                candidate_id: a.candidate_id,
                job_position_id: a.job_position_id,
                status: a.status.as_str().to_string(),
            }))
        }

        async fn application_exists(
            &mut self,
            candidate_id: Uuid,
            job_position_id: Uuid,
        ) -> Result<bool, AppError> {
            Ok(self
                .work
                .applications
                .values()
                .any(|a| a.candidate_id == candidate_id && a.job_position_id == job_position_id))
        }

        async fn insert_application(&mut self, new: &NewApplication) -> Result<Uuid, AppError> {
            if self.application_exists(new.candidate_id, new.job_position_id).await? {
                return Err(AppError::Conflict("duplicate".to_string()));
            }
            let id = Uuid::new_v4();
            self.work.applications.insert(
                id,
                MemApplication {
                    candidate_id: new.candidate_id,
                    job_position_id: new.job_position_id,
                    status: ApplicationStatus::Pending,
                    hr_notes: None,
                    match_percentage: new.match_percentage,
                },
            );
            Ok(id)
        }

        async fn set_application_status(
            &mut self,
            id: Uuid,
            status: ApplicationStatus,
            notes: Option<&str>,
        ) -> Result<bool, AppError> {
            if self.fail_status_for.contains(&id) {
                return Err(simulated("status update"));
            }
            match self.work.applications.get_mut(&id) {
                Some(app) => {
                    app.status = status;
                    if let Some(notes) = notes {
                        app.hr_notes = Some(notes.to_string());
                    }
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn job_position(&mut self, id: Uuid) -> Result<Option<JobPositionRow>, AppError> {
            if self.fail_job_lookup {
                return Err(simulated("job lookup"));
            }
            Ok(self.work.jobs.get(&id).cloned())
        }

        async fn promote_to_employee(
            &mut self,
            user_id: Uuid,
            department: &str,
            job_position_id: Uuid,
        ) -> Result<(), AppError> {
            if self.fail_promote {
                return Err(simulated("role update"));
            }
            match self.work.users.get_mut(&user_id) {
                Some(user) if user.role != UserRole::Hr => {
                    user.role = UserRole::Employee;
                    user.department = Some(department.to_string());
                    user.job_position_id = Some(job_position_id);
                    Ok(())
                }
                _ => Err(AppError::Validation("not a candidate".to_string())),
            }
        }

        async fn assign_onboarding_tasks(
            &mut self,
            employee_id: Uuid,
            department: &str,
        ) -> Result<u64, AppError> {
            let mut inserted = 0;
            for (task_id, dept) in self.work.onboarding_templates.clone() {
                let key = (employee_id, task_id);
                if scoped(department, &dept) && !self.work.onboarding.contains(&key) {
                    self.work.onboarding.push(key);
                    inserted += 1;
                }
            }
            Ok(inserted)
        }

        async fn assign_training_modules(
            &mut self,
            employee_id: Uuid,
            department: &str,
        ) -> Result<u64, AppError> {
            let mut inserted = 0;
            for (module_id, dept) in self.work.training_templates.clone() {
                let key = (employee_id, module_id);
                if scoped(department, &dept) && !self.work.training.contains(&key) {
                    self.work.training.push(key);
                    inserted += 1;
                }
            }
            Ok(inserted)
        }

        async fn ensure_required_documents(
            &mut self,
            employee_id: Uuid,
            documents: &[RequiredDocument],
        ) -> Result<u64, AppError> {
            let mut inserted = 0;
            for doc in documents {
                let key = (employee_id, doc.document_type.to_string());
                if !self.work.documents.contains(&key) {
                    self.work.documents.push(key);
                    inserted += 1;
                }
            }
            Ok(inserted)
        }

        async fn savepoint(&mut self) -> Result<(), AppError> {
            self.savepoints.push(self.work.clone());
            Ok(())
        }

        async fn release_savepoint(&mut self) -> Result<(), AppError> {
            self.savepoints.pop();
            Ok(())
        }

        async fn rollback_to_savepoint(&mut self) -> Result<(), AppError> {
            if let Some(saved) = self.savepoints.pop() {
                self.work = saved;
            }
            Ok(())
        }
    }
}
