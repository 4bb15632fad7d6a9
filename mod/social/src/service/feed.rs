use mingle_core::{ListResult, PageParams};
use mingle_sql::Value;

use crate::model::{Post, PostView};
use crate::service::{SocialError, SocialService};

/// Posts visible to a viewer: their own plus those of every user whose
/// profile the viewer's profile follows.
const FEED_FILTER: &str =
    "owner_id = ?1 OR owner_id IN (\
        SELECT pr.user_id FROM follows f \
        JOIN profiles pr ON pr.id = f.followed_id \
        WHERE f.follower_id = ?2)";

impl SocialService {
    /// Personal feed, newest first. Ties on created_at break by id
    /// descending so the order is total and stable across pages.
    pub fn feed(
        &self,
        viewer_user_id: &str,
        page: PageParams,
    ) -> Result<ListResult<PostView>, SocialError> {
        // A viewer without a profile follows nobody; the empty id
        // matches no edges and the feed degrades to own posts.
        let viewer_profile_id = self
            .get_profile_by_user(viewer_user_id)?
            .map(|p| p.id)
            .unwrap_or_default();

        let count_sql = format!("SELECT COUNT(*) AS cnt FROM posts WHERE {}", FEED_FILTER);
        let rows = self.sql
            .query(
                &count_sql,
                &[
                    Value::Text(viewer_user_id.to_string()),
                    Value::Text(viewer_profile_id.clone()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        let total = rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        let page_sql = format!(
            "SELECT data FROM posts WHERE {} \
             ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4",
            FEED_FILTER,
        );
        let rows = self.sql
            .query(
                &page_sql,
                &[
                    Value::Text(viewer_user_id.to_string()),
                    Value::Text(viewer_profile_id),
                    Value::Integer(page.limit() as i64),
                    Value::Integer(page.offset() as i64),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| SocialError::Internal("missing data column".into()))?;
            let post: Post =
                serde_json::from_str(data).map_err(|e| SocialError::Internal(e.to_string()))?;
            items.push(self.project_post(viewer_user_id, &post)?);
        }

        Ok(ListResult { items, total })
    }
}
