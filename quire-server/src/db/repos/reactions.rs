//! Like/dislike repository
//!
//! Every post and comment owns one `likes` row and one `dislikes` row; the
//! users in each set live in `like_users` / `dislike_users`. Set rows are
//! written together with their post or comment, and `ensure_sets` repairs
//! any target that is missing them. Reads never create rows.

use quire_core::{Membership, SetChange, TargetKind, VoteAction};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use super::DbError;

/// A votable object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    pub id: i64,
}

impl Target {
    pub fn post(id: i64) -> Self {
        Self { kind: TargetKind::Post, id }
    }

    pub fn comment(id: i64) -> Self {
        Self { kind: TargetKind::Comment, id }
    }

    /// Column in the set tables referencing the target
    fn column(&self) -> &'static str {
        match self.kind {
            TargetKind::Post => "post_id",
            TargetKind::Comment => "comment_id",
        }
    }

    fn table(&self) -> &'static str {
        match self.kind {
            TargetKind::Post => "posts",
            TargetKind::Comment => "comments",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SetKind {
    Like,
    Dislike,
}

impl SetKind {
    fn sets(&self) -> &'static str {
        match self {
            Self::Like => "likes",
            Self::Dislike => "dislikes",
        }
    }

    fn members(&self) -> &'static str {
        match self {
            Self::Like => "like_users",
            Self::Dislike => "dislike_users",
        }
    }
}

/// Like and dislike totals for one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteCounts {
    pub likes: i64,
    pub dislikes: i64,
}

/// Create the like and dislike set rows for `target` if absent.
pub(crate) async fn ensure_sets(conn: &mut PgConnection, target: Target) -> Result<(), sqlx::Error> {
    for set in [SetKind::Like, SetKind::Dislike] {
        let sql = format!(
            "INSERT INTO {table} ({col}) VALUES ($1) ON CONFLICT ({col}) DO NOTHING",
            table = set.sets(),
            col = target.column(),
        );
        sqlx::query(&sql).bind(target.id).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Set row id, locked until the transaction ends so concurrent votes on the
/// same target serialize.
async fn lock_set(conn: &mut PgConnection, set: SetKind, target: Target) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "SELECT id FROM {} WHERE {} = $1 FOR UPDATE",
        set.sets(),
        target.column()
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(target.id)
        .fetch_one(&mut *conn)
        .await
}

async fn is_member(
    conn: &mut PgConnection,
    set: SetKind,
    set_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE set_id = $1 AND user_id = $2)",
        set.members()
    );
    sqlx::query_scalar::<_, bool>(&sql)
        .bind(set_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
}

async fn apply_change(
    conn: &mut PgConnection,
    set: SetKind,
    set_id: i64,
    user_id: i64,
    change: SetChange,
) -> Result<(), sqlx::Error> {
    let sql = match change {
        SetChange::Keep => return Ok(()),
        SetChange::Add => format!(
            "INSERT INTO {} (set_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            set.members()
        ),
        SetChange::Remove => format!(
            "DELETE FROM {} WHERE set_id = $1 AND user_id = $2",
            set.members()
        ),
    };

    sqlx::query(&sql)
        .bind(set_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Reaction repository
pub struct ReactionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ReactionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether the post or comment exists.
    pub async fn exists(&self, target: Target) -> Result<bool, DbError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", target.table());
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(target.id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Apply a like/dislike toggle for `user_id` and return the new standing.
    ///
    /// A missing target yields `DbError::NotFound`.
    pub async fn toggle(
        &self,
        target: Target,
        user_id: i64,
        action: VoteAction,
    ) -> Result<Membership, DbError> {
        let mut tx = self.pool.begin().await?;

        let exists_sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", target.table());
        let exists: bool = sqlx::query_scalar(&exists_sql)
            .bind(target.id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(DbError::not_found(target.kind.as_str(), target.id));
        }

        ensure_sets(&mut tx, target).await?;
        let like_set = lock_set(&mut tx, SetKind::Like, target).await?;
        let dislike_set = lock_set(&mut tx, SetKind::Dislike, target).await?;

        let current = Membership {
            liked: is_member(&mut tx, SetKind::Like, like_set, user_id).await?,
            disliked: is_member(&mut tx, SetKind::Dislike, dislike_set, user_id).await?,
        };
        let outcome = current.toggle(action);

        apply_change(&mut tx, SetKind::Like, like_set, user_id, outcome.like).await?;
        apply_change(&mut tx, SetKind::Dislike, dislike_set, user_id, outcome.dislike).await?;
        tx.commit().await?;

        let updated = current.apply(outcome);
        tracing::debug!(
            target_kind = %target.kind,
            target_id = target.id,
            user_id,
            %action,
            liked = updated.liked,
            disliked = updated.disliked,
            "vote applied"
        );
        Ok(updated)
    }

    /// Where `user_id` currently stands on `target`.
    pub async fn membership(&self, target: Target, user_id: i64) -> Result<Membership, DbError> {
        let sql = format!(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM like_users m JOIN likes s ON s.id = m.set_id
                       WHERE s.{col} = $1 AND m.user_id = $2),
                EXISTS(SELECT 1 FROM dislike_users m JOIN dislikes s ON s.id = m.set_id
                       WHERE s.{col} = $1 AND m.user_id = $2)
            "#,
            col = target.column()
        );
        let (liked, disliked): (bool, bool) = sqlx::query_as(&sql)
            .bind(target.id)
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok(Membership { liked, disliked })
    }

    /// Like/dislike totals; a target without set rows counts as zero.
    pub async fn counts(&self, target: Target) -> Result<VoteCounts, DbError> {
        let sql = format!(
            r#"
            SELECT
                (SELECT COUNT(*) FROM like_users m JOIN likes s ON s.id = m.set_id
                 WHERE s.{col} = $1),
                (SELECT COUNT(*) FROM dislike_users m JOIN dislikes s ON s.id = m.set_id
                 WHERE s.{col} = $1)
            "#,
            col = target.column()
        );
        let (likes, dislikes): (i64, i64) = sqlx::query_as(&sql)
            .bind(target.id)
            .fetch_one(self.pool)
            .await?;

        Ok(VoteCounts { likes, dislikes })
    }
}
