//! Two-hop timeline: the posts of everyone a user follows.
//!
//! Step one scans the follows table for rows whose follower is the user and
//! collects the followees. Step two scans the posts table for rows authored
//! by any followee. Both steps are full scans.

use crate::access::Row;
use crate::error::DbResult;
use crate::executor::{
    ExecutionContext, Executor, FilterExecutor, Predicate, RowFilter, RowStream,
    SeqScanExecutor,
};
use log::debug;
use std::collections::HashSet;

/// Tables and columns the timeline walks through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSpec {
    pub follows_table: String,
    pub follower_column: String,
    pub followee_column: String,
    pub posts_table: String,
    pub author_column: String,
}

impl Default for TimelineSpec {
    fn default() -> Self {
        Self {
            follows_table: "follows".to_string(),
            follower_column: "follower".to_string(),
            followee_column: "followee".to_string(),
            posts_table: "posts".to_string(),
            author_column: "user".to_string(),
        }
    }
}

/// Outcome of a timeline query. The two empty cases are kept apart so a
/// caller can tell "follows nobody" from "followees have not posted".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timeline {
    NoFollowees,
    NoPosts { followees: Vec<String> },
    Posts(Vec<Row>),
}

pub struct TimelineExecutor<'a> {
    spec: TimelineSpec,
    context: ExecutionContext<'a>,
}

impl<'a> TimelineExecutor<'a> {
    pub fn new(spec: TimelineSpec, context: ExecutionContext<'a>) -> Self {
        Self { spec, context }
    }

    pub fn execute(&self, user: &str) -> DbResult<Timeline> {
        let followees = self.followees(user)?;
        if followees.is_empty() {
            debug!("'{}' follows nobody", user);
            return Ok(Timeline::NoFollowees);
        }

        let posts = self.scan(
            &self.spec.posts_table,
            RowFilter::OneOf {
                column: self.spec.author_column.clone(),
                values: followees.clone(),
            },
        )?;

        if posts.is_empty() {
            let mut followees: Vec<String> = followees.into_iter().collect();
            followees.sort();
            return Ok(Timeline::NoPosts { followees });
        }

        Ok(Timeline::Posts(posts))
    }

    fn followees(&self, user: &str) -> DbResult<HashSet<String>> {
        let follows = self.scan(
            &self.spec.follows_table,
            RowFilter::Equals(Predicate::new(&self.spec.follower_column, user)),
        )?;

        Ok(follows
            .iter()
            .filter_map(|row| row.get(&self.spec.followee_column))
            .map(str::to_string)
            .collect())
    }

    fn scan(&self, table: &str, filter: RowFilter) -> DbResult<Vec<Row>> {
        let scan: Box<dyn Executor + 'a> = Box::new(SeqScanExecutor::new(table, self.context));
        RowStream::new(Box::new(FilterExecutor::new(scan, filter)))?.collect()
    }
}
