use crate::ratings_fetch::TeamRating;

/// A team's efficiency profile turned into model lines: the spread the team
/// would lay against an average opponent and the total its games project to.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedLine {
    pub rating: TeamRating,
    pub projected_spread: f64,
    pub projected_total: f64,
}

impl ProjectedLine {
    pub fn team(&self) -> &str {
        &self.rating.team
    }
}

pub fn project(rating: TeamRating) -> ProjectedLine {
    let projected_spread = rating.adj_defense - rating.adj_offense;
    let projected_total = rating.adj_offense + rating.adj_defense;
    ProjectedLine {
        rating,
        projected_spread,
        projected_total,
    }
}

pub fn project_all(ratings: Vec<TeamRating>) -> Vec<ProjectedLine> {
    ratings.into_iter().map(project).collect()
}
