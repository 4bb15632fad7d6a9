use mingle_sql::SQLStore;

use crate::service::SocialError;

/// Initialize the SQLite schema for all social resources.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), SocialError> {
    let statements = [
        // Users table: login identity
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)",

        // Profiles table: exactly one per user (UNIQUE user_id carries
        // the invariant; concurrent get-or-create resolves on it)
        "CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            profilename TEXT NOT NULL,
            email TEXT,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_profiles_name ON profiles(profilename)",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_profiles_email
            ON profiles(email) WHERE email IS NOT NULL",

        // Follow edges: directed profile→profile relation. The composite
        // primary key gives set semantics; both columns are indexed so
        // followers and following are cheap derived queries over the
        // same table.
        "CREATE TABLE IF NOT EXISTS follows (
            follower_id TEXT NOT NULL,
            followed_id TEXT NOT NULL,
            added_at TEXT NOT NULL,
            PRIMARY KEY (follower_id, followed_id),
            FOREIGN KEY (follower_id) REFERENCES profiles(id),
            FOREIGN KEY (followed_id) REFERENCES profiles(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_follows_followed ON follows(followed_id)",

        // Posts table
        "CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (owner_id) REFERENCES users(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_posts_owner ON posts(owner_id)",
        "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at)",

        // Likes: at most one per (post, user) — the UNIQUE pair is the
        // atomicity primitive for the toggle
        "CREATE TABLE IF NOT EXISTS likes (
            id TEXT PRIMARY KEY,
            post_id TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (post_id, owner_id),
            FOREIGN KEY (post_id) REFERENCES posts(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id)",

        // Sessions table: JWT issuance records
        "CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            issued_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| SocialError::Storage(e.to_string()))?;
    }

    Ok(())
}
