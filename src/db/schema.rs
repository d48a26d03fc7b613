//! SQL issued by the bootstrap handler.
//! Postgres-only; the role statement relies on Aurora's `rds_iam` role.

use crate::db::models::RoleName;

/// Schema whose existing tables the IAM role may read and write.
pub const GRANT_SCHEMA: &str = "public";

/// Read-only metadata query used to prove an IAM session is usable.
pub const LIST_TABLES: &str = "SELECT table_name::text FROM information_schema.tables";

/// Conditional block that creates `role` only when it is missing:
/// - `CREATE USER` (login role without a password)
/// - `GRANT rds_iam` so logins authenticate with IAM tokens
/// - `SELECT, INSERT, UPDATE, DELETE` on tables that exist in `public` right now
///
/// An existing role is left untouched; grants are not re-applied and tables
/// created later are not covered.
pub fn ensure_iam_role_sql(role: &RoleName) -> String {
    let ident = role.quoted_ident();
    format!(
        r#"
DO $$
BEGIN
  IF NOT EXISTS (SELECT FROM pg_catalog.pg_roles WHERE rolname = {literal}) THEN
    CREATE USER {ident};
    GRANT rds_iam TO {ident};
    GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA {schema} TO {ident};
  END IF;
END
$$;
"#,
        literal = role.quoted_literal(),
        schema = GRANT_SCHEMA,
    )
}
