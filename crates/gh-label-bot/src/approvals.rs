//! Approval counting

use gh_client::Review;

/// Review state GitHub reports for an approving review
pub const APPROVED: &str = "APPROVED";

/// Count reviews whose state is exactly `APPROVED`
///
/// No deduplication by reviewer: someone who approves, gets dismissed and
/// approves again counts twice.
pub fn count_approvals(reviews: &[Review]) -> usize {
    reviews.iter().filter(|r| r.state == APPROVED).count()
}
