use crate::db::{open_db, SharedConnection};
use chrono::Utc;
use goldportal::remote::model::{
    AppointmentRequest, CustomerPublicView, DailyGoldUpdate, FeedbackEntry, TestResult,
};
use goldportal::remote::{DataService, DataServiceError, RejectedSnafu};
use log::info;
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::MutexGuard;

const DATA_SERVICE_CHANGELOG_0: &str = "
CREATE TABLE content (
    section TEXT PRIMARY KEY,
    content TEXT NOT NULL
);
CREATE TABLE customer (
    username TEXT PRIMARY KEY,
    password TEXT NOT NULL,
    mobile_number TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE TABLE appointment (
    id INTEGER PRIMARY KEY,
    serial_number TEXT NOT NULL,
    test_type TEXT NOT NULL,
    appointment_date TEXT NOT NULL,
    request_time INTEGER NOT NULL
);
CREATE TABLE feedback (
    id INTEGER PRIMARY KEY,
    customer_first_name TEXT NOT NULL,
    feedback TEXT NOT NULL
);
CREATE TABLE test_result (
    serial_number TEXT PRIMARY KEY,
    data TEXT NOT NULL,
    modified_at INTEGER NOT NULL
);
CREATE TABLE daily_gold_update (
    date TEXT PRIMARY KEY,
    content TEXT NOT NULL
);
CREATE TABLE reset_passcode (
    mobile_number TEXT PRIMARY KEY,
    passcode TEXT NOT NULL
);
CREATE TABLE pending_password_reset (
    mobile_number TEXT PRIMARY KEY,
    new_password TEXT NOT NULL
);
";

pub const DATA_SERVICE_CHANGELOGS: [&str; 1] = [DATA_SERVICE_CHANGELOG_0];

pub fn open_data_service_db(db_dir: &Path) -> SharedConnection {
    open_db(db_dir, "data_service", &DATA_SERVICE_CHANGELOGS)
}

/// The shop's data service backed by sqlite.
pub struct SqliteDataService {
    conn: SharedConnection,
}

impl SqliteDataService {
    pub fn new(conn: SharedConnection) -> SqliteDataService {
        SqliteDataService { conn }
    }

    fn db(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

fn unavailable<E>(e: E) -> DataServiceError
where
    E: std::error::Error,
{
    DataServiceError::UnavailableError {
        message: e.to_string(),
    }
}

fn map_appointment(row: &Row) -> rusqlite::Result<AppointmentRequest> {
    Ok(AppointmentRequest {
        serial_number: row.get(0)?,
        test_type: row.get(1)?,
        appointment_date: row.get(2)?,
        request_time: row.get(3)?,
    })
}

impl DataService for SqliteDataService {
    fn add_appointment(
        &self,
        serial_number: &str,
        test_type: &str,
        appointment_date: &str,
    ) -> Result<(), DataServiceError> {
        info!("Adding appointment for serial_number={serial_number}");

        self.db()
            .execute(
                "INSERT INTO appointment (serial_number, test_type, appointment_date, request_time)
                     VALUES (?1, ?2, ?3, ?4)",
                (
                    serial_number,
                    test_type,
                    appointment_date,
                    Utc::now().timestamp_millis(),
                ),
            )
            .map_err(unavailable)?;

        Ok(())
    }

    fn add_customer(
        &self,
        username: &str,
        password: &str,
        mobile_number: &str,
        email: &str,
    ) -> Result<(), DataServiceError> {
        let inserted = self
            .db()
            .execute(
                "INSERT INTO customer (username, password, mobile_number, email, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (username) DO NOTHING",
                (
                    username,
                    password,
                    mobile_number,
                    email,
                    Utc::now().timestamp_millis(),
                ),
            )
            .map_err(unavailable)?;

        if inserted == 0 {
            return RejectedSnafu {
                reject_text: "Username already exists",
            }
            .fail();
        }

        info!("Added customer {username}");
        Ok(())
    }

    fn add_feedback_entry(
        &self,
        feedback: &str,
        customer_first_name: &str,
    ) -> Result<(), DataServiceError> {
        self.db()
            .execute(
                "INSERT INTO feedback (customer_first_name, feedback) VALUES (?1, ?2)",
                (customer_first_name, feedback),
            )
            .map_err(unavailable)?;

        Ok(())
    }

    fn add_reset_passcode(
        &self,
        mobile_number: &str,
        passcode: &str,
    ) -> Result<(), DataServiceError> {
        self.db()
            .execute(
                "INSERT INTO reset_passcode (mobile_number, passcode) VALUES (?1, ?2)
                     ON CONFLICT (mobile_number) DO UPDATE SET passcode = excluded.passcode",
                (mobile_number, passcode),
            )
            .map_err(unavailable)?;

        Ok(())
    }

    fn finalize_password_reset(&self, mobile_number: &str) -> Result<bool, DataServiceError> {
        let mut db = self.db();
        let transaction = db.transaction().map_err(unavailable)?;

        let new_password: Option<String> = transaction
            .query_row(
                "SELECT new_password FROM pending_password_reset WHERE mobile_number = ?1",
                (mobile_number,),
                |row| row.get(0),
            )
            .optional()
            .map_err(unavailable)?;

        let Some(new_password) = new_password else {
            return Ok(false);
        };

        for table in ["pending_password_reset", "reset_passcode"] {
            transaction
                .execute(
                    &format!("DELETE FROM {table} WHERE mobile_number = ?1"),
                    (mobile_number,),
                )
                .map_err(unavailable)?;
        }
        let updated = transaction
            .execute(
                "UPDATE customer SET password = ?1 WHERE mobile_number = ?2",
                (new_password.as_str(), mobile_number),
            )
            .map_err(unavailable)?;

        transaction.commit().map_err(unavailable)?;

        info!("Finalized password reset for {mobile_number}");
        Ok(updated > 0)
    }

    fn get_all_customers_public_view(&self) -> Result<Vec<CustomerPublicView>, DataServiceError> {
        let db = self.db();
        let mut statement = db
            .prepare("SELECT username, mobile_number FROM customer ORDER BY created_at")
            .map_err(unavailable)?;

        let customers = statement
            .query_map((), |row| {
                Ok(CustomerPublicView {
                    username: row.get(0)?,
                    mobile_number: row.get(1)?,
                })
            })
            .map_err(unavailable)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(unavailable)?;

        Ok(customers)
    }

    fn get_all_entries(&self) -> Result<Vec<FeedbackEntry>, DataServiceError> {
        let db = self.db();
        let mut statement = db
            .prepare("SELECT customer_first_name, feedback FROM feedback ORDER BY id")
            .map_err(unavailable)?;

        let entries = statement
            .query_map((), |row| {
                Ok(FeedbackEntry {
                    customer_first_name: row.get(0)?,
                    feedback: row.get(1)?,
                })
            })
            .map_err(unavailable)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(unavailable)?;

        Ok(entries)
    }

    fn get_appointments(&self) -> Result<Vec<AppointmentRequest>, DataServiceError> {
        let db = self.db();
        let mut statement = db
            .prepare(
                "SELECT serial_number, test_type, appointment_date, request_time
                     FROM appointment ORDER BY id",
            )
            .map_err(unavailable)?;

        let appointments = statement
            .query_map((), map_appointment)
            .map_err(unavailable)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(unavailable)?;

        Ok(appointments)
    }

    fn get_content(&self, section: &str) -> Result<String, DataServiceError> {
        let content: Option<String> = self
            .db()
            .query_row(
                "SELECT content FROM content WHERE section = ?1",
                (section,),
                |row| row.get(0),
            )
            .optional()
            .map_err(unavailable)?;

        Ok(content.unwrap_or_default())
    }

    fn get_customer_count(&self) -> Result<u64, DataServiceError> {
        let count: i64 = self
            .db()
            .query_row("SELECT COUNT(*) FROM customer", (), |row| row.get(0))
            .map_err(unavailable)?;

        Ok(count as u64)
    }

    fn get_test_result(&self, serial_number: &str) -> Result<Option<TestResult>, DataServiceError> {
        let data: Option<String> = self
            .db()
            .query_row(
                "SELECT data FROM test_result WHERE serial_number = ?1",
                (serial_number,),
                |row| row.get(0),
            )
            .optional()
            .map_err(unavailable)?;

        data.map(|data| serde_json::from_str(&data).map_err(unavailable))
            .transpose()
    }

    fn request_password_reset(
        &self,
        mobile_number: &str,
        new_password: &str,
    ) -> Result<(), DataServiceError> {
        let db = self.db();
        let known: bool = db
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM customer WHERE mobile_number = ?1)",
                (mobile_number,),
                |row| row.get(0),
            )
            .map_err(unavailable)?;

        if !known {
            return RejectedSnafu {
                reject_text: "No customer is registered with this mobile number",
            }
            .fail();
        }

        db.execute(
            "INSERT INTO pending_password_reset (mobile_number, new_password) VALUES (?1, ?2)
                 ON CONFLICT (mobile_number) DO UPDATE SET new_password = excluded.new_password",
            (mobile_number, new_password),
        )
        .map_err(unavailable)?;

        Ok(())
    }

    fn update_content(&self, section: &str, content: &str) -> Result<(), DataServiceError> {
        info!("Updating content of section {section}");

        self.db()
            .execute(
                "INSERT INTO content (section, content) VALUES (?1, ?2)
                     ON CONFLICT (section) DO UPDATE SET content = excluded.content",
                (section, content),
            )
            .map_err(unavailable)?;

        Ok(())
    }

    fn update_test_result(&self, test_result: TestResult) -> Result<(), DataServiceError> {
        let data = serde_json::to_string(&test_result).map_err(unavailable)?;

        self.db()
            .execute(
                "INSERT INTO test_result (serial_number, data, modified_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT (serial_number)
                     DO UPDATE SET data = excluded.data, modified_at = excluded.modified_at",
                (
                    test_result.serial_number.as_str(),
                    data.as_str(),
                    Utc::now().timestamp_millis(),
                ),
            )
            .map_err(unavailable)?;

        Ok(())
    }

    fn verify_reset_passcode(
        &self,
        mobile_number: &str,
        passcode: &str,
    ) -> Result<bool, DataServiceError> {
        let stored: Option<String> = self
            .db()
            .query_row(
                "SELECT passcode FROM reset_passcode WHERE mobile_number = ?1",
                (mobile_number,),
                |row| row.get(0),
            )
            .optional()
            .map_err(unavailable)?;

        Ok(stored.as_deref() == Some(passcode))
    }

    fn get_all_daily_gold_updates(&self) -> Result<Vec<DailyGoldUpdate>, DataServiceError> {
        let db = self.db();
        let mut statement = db
            .prepare("SELECT date, content FROM daily_gold_update ORDER BY date")
            .map_err(unavailable)?;

        let updates = statement
            .query_map((), |row| {
                Ok(DailyGoldUpdate {
                    date: row.get(0)?,
                    content: row.get(1)?,
                })
            })
            .map_err(unavailable)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(unavailable)?;

        Ok(updates)
    }

    fn set_daily_gold_update(&self, date: &str, content: &str) -> Result<(), DataServiceError> {
        info!("Setting daily gold update for {date}");

        self.db()
            .execute(
                "INSERT INTO daily_gold_update (date, content) VALUES (?1, ?2)
                     ON CONFLICT (date) DO UPDATE SET content = excluded.content",
                (date, content),
            )
            .map_err(unavailable)?;

        Ok(())
    }
}
