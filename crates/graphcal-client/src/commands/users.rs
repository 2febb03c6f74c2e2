//! `graphcal users`

use graphcal_graph::{Filter, GraphClient, User, UserQuery};

use crate::error::ClientResult;
use crate::output::{self, OutputFormat};

/// Builds the user query from command-line options.
///
/// `department` and `job_title` become `eq` clauses; a raw `filter` is
/// combined with them using `and`. `limit` caps the total across pages,
/// `top` sets the page size.
pub fn build_query(
    filter: Option<&str>,
    department: Option<&str>,
    job_title: Option<&str>,
    limit: Option<usize>,
    top: Option<usize>,
) -> UserQuery {
    let mut clauses = Filter::new();
    if let Some(raw) = filter {
        clauses = clauses.raw(raw);
    }
    if let Some(department) = department {
        clauses = clauses.eq("department", department);
    }
    if let Some(job_title) = job_title {
        clauses = clauses.eq("jobTitle", job_title);
    }

    let mut query = UserQuery::new().with_filter(clauses);
    if let Some(limit) = limit {
        query = query.with_max_results(limit);
    }
    if let Some(top) = top {
        query = query.with_top(top);
    }
    query
}

/// Lists users and prints them.
pub async fn run(
    client: &GraphClient,
    query: &UserQuery,
    format: OutputFormat,
) -> ClientResult<Vec<User>> {
    let users = client.list_users(query).await?;
    print_users(&users, format)?;
    Ok(users)
}

pub(crate) fn print_users(users: &[User], format: OutputFormat) -> ClientResult<()> {
    match format {
        OutputFormat::Json => output::print_json(users),
        OutputFormat::Text => {
            for user in users {
                println!("{}", output::user_line(user));
            }
            Ok(())
        }
    }
}
