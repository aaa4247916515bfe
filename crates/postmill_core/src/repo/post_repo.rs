//! Post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Insert posts and serve the read queries used by list/detail views.
//! - Translate slug uniqueness failures into a semantic error.
//!
//! # Invariants
//! - Read queries only return rows with `published = 1`.
//! - The rate-limit lookup (`latest_created_at`) considers every row.
//! - Recent-post ordering is `created_at DESC, id DESC`.

use crate::model::post::{NewPost, Post, PostId, PostSummary};
use crate::repo::{count_to_u64, ensure_connection_ready, int_to_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

/// Page size used when a list query leaves `limit` unset.
pub const RECENT_POSTS_DEFAULT_LIMIT: u32 = 10;

const POST_SELECT_SQL: &str = "SELECT
    id,
    slug,
    title,
    meta_description,
    content,
    books_html,
    topic_used,
    created_at,
    published
FROM posts";

/// Pagination options for recent-post listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostListQuery {
    /// Maximum rows to return. Defaults to 10.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for post persistence.
pub trait PostRepository {
    /// Inserts one post stamped with `created_at` (epoch ms); returns its id.
    fn insert_post(&self, post: &NewPost<'_>, created_at: i64) -> RepoResult<PostId>;
    /// Lists published posts, most recent first.
    fn list_recent(&self, query: &PostListQuery) -> RepoResult<Vec<PostSummary>>;
    /// Gets the published post with the given slug.
    fn get_by_slug(&self, slug: &str) -> RepoResult<Option<Post>>;
    /// Counts published posts.
    fn count_published(&self) -> RepoResult<u64>;
    /// Returns the newest `created_at` across all posts, published or not.
    fn latest_created_at(&self) -> RepoResult<Option<i64>>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["posts"])?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn insert_post(&self, post: &NewPost<'_>, created_at: i64) -> RepoResult<PostId> {
        let result = self.conn.execute(
            "INSERT INTO posts (
                title,
                slug,
                meta_description,
                content,
                books_html,
                topic_used,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                post.title,
                post.slug,
                post.meta_description,
                post.content,
                post.books_html,
                post.topic_used,
                created_at,
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::UniqueConstraintViolation {
                slug: post.slug.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn list_recent(&self, query: &PostListQuery) -> RepoResult<Vec<PostSummary>> {
        let limit = query.limit.unwrap_or(RECENT_POSTS_DEFAULT_LIMIT);
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                slug,
                title,
                meta_description,
                created_at
             FROM posts
             WHERE published = 1
             ORDER BY created_at DESC, id DESC
             LIMIT ?1 OFFSET ?2;",
        )?;

        let mut rows = stmt.query(params![i64::from(limit), i64::from(query.offset)])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(PostSummary {
                id: row.get("id")?,
                slug: row.get("slug")?,
                title: row.get("title")?,
                meta_description: row.get("meta_description")?,
                created_at: row.get("created_at")?,
            });
        }

        Ok(posts)
    }

    fn get_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE slug = ?1
               AND published = 1
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query([slug])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }

        Ok(None)
    }

    fn count_published(&self) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM posts WHERE published = 1;", [], |row| {
                    row.get(0)
                })?;
        count_to_u64(count, "posts count")
    }

    fn latest_created_at(&self) -> RepoResult<Option<i64>> {
        let latest = self
            .conn
            .query_row(
                "SELECT created_at FROM posts ORDER BY created_at DESC LIMIT 1;",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(latest)
    }
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let published = int_to_bool(row.get("published")?, "posts.published")?;

    Ok(Post {
        id: row.get("id")?,
        slug: row.get("slug")?,
        title: row.get("title")?,
        meta_description: row.get("meta_description")?,
        content: row.get("content")?,
        books_html: row.get("books_html")?,
        topic_used: row.get("topic_used")?,
        created_at: row.get("created_at")?,
        published,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
