use rusqlite::{params, Connection, OptionalExtension};

use crate::db::repository::parse_uuid;
use crate::db::DatabaseError;
use crate::models::User;

/// Insert an account row. `token_hash` is the base64 SHA-256 of the
/// bearer token the account authenticates with.
pub fn insert_user(conn: &Connection, user: &User, token_hash: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, email, token_hash) VALUES (?1, ?2, ?3, ?4)",
        params![user.id.to_string(), user.name, user.email, token_hash],
    )?;
    Ok(())
}

/// Resolve the account a bearer token belongs to, if any.
pub fn find_user_by_token_hash(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, email FROM users WHERE token_hash = ?1",
            params![token_hash],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, name, email)| {
        Ok(User {
            id: parse_uuid(&id)?,
            name,
            email,
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use uuid::Uuid;

    #[test]
    fn token_hash_resolves_user() {
        let conn = open_memory_database().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
        };
        insert_user(&conn, &user, "abc123").unwrap();

        let found = find_user_by_token_hash(&conn, "abc123").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "ana@example.com");

        assert!(find_user_by_token_hash(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn token_hash_is_unique() {
        let conn = open_memory_database().unwrap();
        let mk = |email: &str| User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: email.into(),
        };
        insert_user(&conn, &mk("a@example.com"), "same").unwrap();
        assert!(insert_user(&conn, &mk("b@example.com"), "same").is_err());
    }
}
