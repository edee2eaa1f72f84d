//! [`SqliteStore`], the SQLite implementation of [`ConfigStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use ringpage_core::{
  credential::{Credential, CredentialPatch, NewCredential},
  demo_page::{DemoPage, DemoPageDraft, VariableBindings},
  provider_entity::{
    Assistant, AssistantPatch, NewAssistant, NewPhoneNumber, PhoneNumber,
    PhoneNumberPatch, UpsertOutcome,
  },
  store::ConfigStore,
};

use crate::{
  Result,
  encode::{
    ASSISTANT_COLUMNS, CREDENTIAL_COLUMNS, DEMO_PAGE_COLUMNS, PHONE_NUMBER_COLUMNS,
    RawAssistant, RawCredential, RawDemoPage, RawPhoneNumber, encode_dt, encode_fields,
    encode_uuid, encode_variables, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A ringpage configuration store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection handle is shared.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete the row with `id` from `table`. `table` is always a literal.
  async fn delete_by_id(&self, table: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("DELETE FROM {table} WHERE id = ?1"),
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  async fn fetch_demo_page(&self, sql: String, key: String) -> Result<Option<DemoPage>> {
    let raw: Option<RawDemoPage> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(&sql, rusqlite::params![key], RawDemoPage::from_row)
          .optional()?)
      })
      .await?;
    raw.map(RawDemoPage::into_demo_page).transpose()
  }
}

// ─── ConfigStore impl ────────────────────────────────────────────────────────

impl ConfigStore for SqliteStore {
  type Error = crate::Error;

  // ── Credentials ───────────────────────────────────────────────────────────

  async fn create_credential(&self, input: NewCredential) -> Result<Credential> {
    let at = now();
    let credential = Credential {
      id:           Uuid::new_v4(),
      name:         input.name,
      secret_value: input.secret_value,
      is_active:    true,
      created_at:   at,
      updated_at:   at,
    };

    let id_str = encode_uuid(credential.id);
    let name   = credential.name.clone();
    let secret = credential.secret_value.clone();
    let at_str = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO credentials (id, name, secret_value, is_active, created_at, updated_at)
           VALUES (?1, ?2, ?3, 1, ?4, ?4)",
          rusqlite::params![id_str, name, secret, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(credential)
  }

  async fn get_credential(&self, id: Uuid) -> Result<Option<Credential>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawCredential> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE id = ?1"),
            rusqlite::params![id_str],
            RawCredential::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawCredential::into_credential).transpose()
  }

  async fn list_credentials(&self) -> Result<Vec<Credential>> {
    let raws: Vec<RawCredential> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CREDENTIAL_COLUMNS} FROM credentials ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawCredential::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawCredential::into_credential).collect()
  }

  async fn update_credential(
    &self,
    id: Uuid,
    patch: CredentialPatch,
  ) -> Result<Option<Credential>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let raw: Option<RawCredential> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE credentials SET
             name         = COALESCE(?2, name),
             secret_value = COALESCE(?3, secret_value),
             is_active    = COALESCE(?4, is_active),
             updated_at   = ?5
           WHERE id = ?1",
          rusqlite::params![id_str, patch.name, patch.secret_value, patch.is_active, at_str],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(conn
          .query_row(
            &format!("SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE id = ?1"),
            rusqlite::params![id_str],
            RawCredential::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawCredential::into_credential).transpose()
  }

  async fn delete_credential(&self, id: Uuid) -> Result<bool> {
    self.delete_by_id("credentials", id).await
  }

  // ── Assistants ────────────────────────────────────────────────────────────

  async fn create_assistant(&self, input: NewAssistant) -> Result<Assistant> {
    let at = now();
    let assistant = Assistant {
      id:                    Uuid::new_v4(),
      name:                  input.name,
      provider_assistant_id: input.provider_assistant_id,
      is_active:             input.is_active,
      created_at:            at,
      updated_at:            at,
    };

    let id_str      = encode_uuid(assistant.id);
    let name        = assistant.name.clone();
    let provider_id = assistant.provider_assistant_id.clone();
    let active      = assistant.is_active;
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO assistants (id, name, provider_assistant_id, is_active, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, name, provider_id, active, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(assistant)
  }

  async fn get_assistant(&self, id: Uuid) -> Result<Option<Assistant>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawAssistant> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ASSISTANT_COLUMNS} FROM assistants WHERE id = ?1"),
            rusqlite::params![id_str],
            RawAssistant::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawAssistant::into_assistant).transpose()
  }

  async fn list_assistants(&self) -> Result<Vec<Assistant>> {
    let raws: Vec<RawAssistant> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ASSISTANT_COLUMNS} FROM assistants ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawAssistant::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAssistant::into_assistant).collect()
  }

  async fn update_assistant(
    &self,
    id: Uuid,
    patch: AssistantPatch,
  ) -> Result<Option<Assistant>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let raw: Option<RawAssistant> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE assistants SET
             name                  = COALESCE(?2, name),
             provider_assistant_id = COALESCE(?3, provider_assistant_id),
             is_active             = COALESCE(?4, is_active),
             updated_at            = ?5
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            patch.name,
            patch.provider_assistant_id,
            patch.is_active,
            at_str
          ],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(conn
          .query_row(
            &format!("SELECT {ASSISTANT_COLUMNS} FROM assistants WHERE id = ?1"),
            rusqlite::params![id_str],
            RawAssistant::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawAssistant::into_assistant).transpose()
  }

  async fn delete_assistant(&self, id: Uuid) -> Result<bool> {
    self.delete_by_id("assistants", id).await
  }

  async fn upsert_assistant(&self, input: NewAssistant) -> Result<(Assistant, UpsertOutcome)> {
    let new_id = encode_uuid(Uuid::new_v4());
    let at_str = encode_dt(now());

    let (raw, outcome) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<String> = tx
          .query_row(
            "SELECT id FROM assistants WHERE provider_assistant_id = ?1",
            rusqlite::params![input.provider_assistant_id],
            |r| r.get(0),
          )
          .optional()?;

        let (id_str, outcome) = match existing {
          Some(id_str) => {
            tx.execute(
              "UPDATE assistants SET name = ?2, is_active = ?3, updated_at = ?4 WHERE id = ?1",
              rusqlite::params![id_str, input.name, input.is_active, at_str],
            )?;
            (id_str, UpsertOutcome::Updated)
          }
          None => {
            tx.execute(
              "INSERT INTO assistants (id, name, provider_assistant_id, is_active, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
              rusqlite::params![
                new_id,
                input.name,
                input.provider_assistant_id,
                input.is_active,
                at_str
              ],
            )?;
            (new_id, UpsertOutcome::Created)
          }
        };

        let raw = tx.query_row(
          &format!("SELECT {ASSISTANT_COLUMNS} FROM assistants WHERE id = ?1"),
          rusqlite::params![id_str],
          RawAssistant::from_row,
        )?;
        tx.commit()?;
        Ok((raw, outcome))
      })
      .await?;

    Ok((raw.into_assistant()?, outcome))
  }

  // ── Phone numbers ─────────────────────────────────────────────────────────

  async fn create_phone_number(&self, input: NewPhoneNumber) -> Result<PhoneNumber> {
    let at = now();
    let phone = PhoneNumber {
      id:                       Uuid::new_v4(),
      name:                     input.name,
      provider_phone_number_id: input.provider_phone_number_id,
      display_number:           input.display_number,
      is_active:                input.is_active,
      created_at:               at,
      updated_at:               at,
    };

    let id_str      = encode_uuid(phone.id);
    let name        = phone.name.clone();
    let provider_id = phone.provider_phone_number_id.clone();
    let display     = phone.display_number.clone();
    let active      = phone.is_active;
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO phone_numbers
             (id, name, provider_phone_number_id, display_number, is_active, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, name, provider_id, display, active, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(phone)
  }

  async fn get_phone_number(&self, id: Uuid) -> Result<Option<PhoneNumber>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawPhoneNumber> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PHONE_NUMBER_COLUMNS} FROM phone_numbers WHERE id = ?1"),
            rusqlite::params![id_str],
            RawPhoneNumber::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawPhoneNumber::into_phone_number).transpose()
  }

  async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumber>> {
    let raws: Vec<RawPhoneNumber> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PHONE_NUMBER_COLUMNS} FROM phone_numbers ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawPhoneNumber::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawPhoneNumber::into_phone_number).collect()
  }

  async fn update_phone_number(
    &self,
    id: Uuid,
    patch: PhoneNumberPatch,
  ) -> Result<Option<PhoneNumber>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());
    let set_display = patch.display_number.is_some();
    let display = patch.display_number.flatten();

    let raw: Option<RawPhoneNumber> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE phone_numbers SET
             name                     = COALESCE(?2, name),
             provider_phone_number_id = COALESCE(?3, provider_phone_number_id),
             display_number           = CASE WHEN ?4 THEN ?5 ELSE display_number END,
             is_active                = COALESCE(?6, is_active),
             updated_at               = ?7
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            patch.name,
            patch.provider_phone_number_id,
            set_display,
            display,
            patch.is_active,
            at_str
          ],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(conn
          .query_row(
            &format!("SELECT {PHONE_NUMBER_COLUMNS} FROM phone_numbers WHERE id = ?1"),
            rusqlite::params![id_str],
            RawPhoneNumber::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawPhoneNumber::into_phone_number).transpose()
  }

  async fn delete_phone_number(&self, id: Uuid) -> Result<bool> {
    self.delete_by_id("phone_numbers", id).await
  }

  async fn upsert_phone_number(
    &self,
    input: NewPhoneNumber,
  ) -> Result<(PhoneNumber, UpsertOutcome)> {
    let new_id = encode_uuid(Uuid::new_v4());
    let at_str = encode_dt(now());

    let (raw, outcome) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<String> = tx
          .query_row(
            "SELECT id FROM phone_numbers WHERE provider_phone_number_id = ?1",
            rusqlite::params![input.provider_phone_number_id],
            |r| r.get(0),
          )
          .optional()?;

        let (id_str, outcome) = match existing {
          Some(id_str) => {
            tx.execute(
              "UPDATE phone_numbers
                 SET name = ?2, display_number = ?3, is_active = ?4, updated_at = ?5
               WHERE id = ?1",
              rusqlite::params![
                id_str,
                input.name,
                input.display_number,
                input.is_active,
                at_str
              ],
            )?;
            (id_str, UpsertOutcome::Updated)
          }
          None => {
            tx.execute(
              "INSERT INTO phone_numbers
                 (id, name, provider_phone_number_id, display_number, is_active, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
              rusqlite::params![
                new_id,
                input.name,
                input.provider_phone_number_id,
                input.display_number,
                input.is_active,
                at_str
              ],
            )?;
            (new_id, UpsertOutcome::Created)
          }
        };

        let raw = tx.query_row(
          &format!("SELECT {PHONE_NUMBER_COLUMNS} FROM phone_numbers WHERE id = ?1"),
          rusqlite::params![id_str],
          RawPhoneNumber::from_row,
        )?;
        tx.commit()?;
        Ok((raw, outcome))
      })
      .await?;

    Ok((raw.into_phone_number()?, outcome))
  }

  // ── Demo pages ────────────────────────────────────────────────────────────

  async fn create_demo_page(&self, draft: DemoPageDraft) -> Result<DemoPage> {
    let at = now();
    let id = Uuid::new_v4();

    let fields_json = encode_fields(&draft.fields)?;
    let vars_json   = encode_variables(&draft.variables)?;
    let id_str      = encode_uuid(id);
    let cred_str    = encode_uuid(draft.credential_id);
    let asst_str    = encode_uuid(draft.assistant_id);
    let phone_str   = encode_uuid(draft.phone_number_id);
    let at_str      = encode_dt(at);
    let d           = draft.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO demo_pages (
             id, slug, title, credential_id, assistant_id, phone_number_id,
             fields_json, call_to_field_key, variables_json, variable_values_json,
             password_required, password_hash, max_calls, calls_made, is_active,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, '{}', ?10, ?11, ?12, 0, ?13, ?14, ?14)",
          rusqlite::params![
            id_str,
            d.slug,
            d.title,
            cred_str,
            asst_str,
            phone_str,
            fields_json,
            d.call_to_field_key,
            vars_json,
            d.password_required,
            d.password_hash,
            d.max_calls,
            d.is_active,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(DemoPage {
      id,
      slug: draft.slug,
      title: draft.title,
      credential_id: draft.credential_id,
      assistant_id: draft.assistant_id,
      phone_number_id: draft.phone_number_id,
      fields: draft.fields,
      call_to_field_key: draft.call_to_field_key,
      variables: VariableBindings::List(draft.variables),
      password_required: draft.password_required,
      password_hash: draft.password_hash,
      max_calls: draft.max_calls,
      calls_made: 0,
      is_active: draft.is_active,
      created_at: at,
      updated_at: at,
    })
  }

  async fn get_demo_page(&self, id: Uuid) -> Result<Option<DemoPage>> {
    self
      .fetch_demo_page(
        format!("SELECT {DEMO_PAGE_COLUMNS} FROM demo_pages WHERE id = ?1"),
        encode_uuid(id),
      )
      .await
  }

  async fn find_active_demo_page(&self, slug: &str) -> Result<Option<DemoPage>> {
    self
      .fetch_demo_page(
        format!("SELECT {DEMO_PAGE_COLUMNS} FROM demo_pages WHERE slug = ?1 AND is_active = 1"),
        slug.to_owned(),
      )
      .await
  }

  async fn list_demo_pages(&self) -> Result<Vec<DemoPage>> {
    let raws: Vec<RawDemoPage> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DEMO_PAGE_COLUMNS} FROM demo_pages ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawDemoPage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawDemoPage::into_demo_page).collect()
  }

  async fn update_demo_page(&self, id: Uuid, draft: DemoPageDraft) -> Result<Option<DemoPage>> {
    let fields_json = encode_fields(&draft.fields)?;
    let vars_json   = encode_variables(&draft.variables)?;
    let id_str      = encode_uuid(id);
    let cred_str    = encode_uuid(draft.credential_id);
    let asst_str    = encode_uuid(draft.assistant_id);
    let phone_str   = encode_uuid(draft.phone_number_id);
    let at_str      = encode_dt(now());

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE demo_pages SET
             slug              = ?2,
             title             = ?3,
             credential_id     = ?4,
             assistant_id      = ?5,
             phone_number_id   = ?6,
             fields_json       = ?7,
             call_to_field_key = ?8,
             variables_json    = ?9,
             password_required = ?10,
             password_hash     = ?11,
             max_calls         = ?12,
             is_active         = ?13,
             updated_at        = ?14
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            draft.slug,
            draft.title,
            cred_str,
            asst_str,
            phone_str,
            fields_json,
            draft.call_to_field_key,
            vars_json,
            draft.password_required,
            draft.password_hash,
            draft.max_calls,
            draft.is_active,
            at_str,
          ],
        )?)
      })
      .await?;

    if n == 0 {
      return Ok(None);
    }
    self.get_demo_page(id).await
  }

  async fn delete_demo_page(&self, id: Uuid) -> Result<bool> {
    self.delete_by_id("demo_pages", id).await
  }

  async fn increment_calls_made(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE demo_pages SET calls_made = calls_made + 1 WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  async fn reset_calls_made(&self, id: Uuid) -> Result<Option<DemoPage>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE demo_pages SET calls_made = 0, updated_at = ?2 WHERE id = ?1",
          rusqlite::params![id_str, at_str],
        )?)
      })
      .await?;

    if n == 0 {
      return Ok(None);
    }
    self.get_demo_page(id).await
  }
}
