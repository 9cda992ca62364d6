use crate::TestDescriptor;

/// The id of a group is its position in the sequence of groups of a problem. Group `0` is, by
/// convention, the group of the samples.
pub type GroupId = u32;

/// The group of the samples.
pub const SAMPLES_GROUP: GroupId = 0;

/// How the score of a group is split among its tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupScoring {
    /// Every test contributes independently, the score is split as evenly as possible.
    Sum,
    /// The score is awarded only if every test passes: the first test carries all the points.
    AllOrNothing,
}

/// An ordered bucket of tests sharing the same scoring rule.
///
/// The points of each test are computed once, when the group is built, and always sum up to the
/// score of the group.
#[derive(Debug)]
pub struct Group {
    score: u32,
    tests: Vec<TestDescriptor>,
    scoring: GroupScoring,
    points: Vec<u32>,
}

impl Group {
    /// Make a new group worth `score` points.
    pub fn new(score: u32, tests: Vec<TestDescriptor>, scoring: GroupScoring) -> Group {
        let points = distribute_points(score, tests.len(), scoring);
        Group {
            score,
            tests,
            scoring,
            points,
        }
    }

    /// The score of the group, the sum of the points of its tests.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// How the score is split among the tests.
    pub fn scoring(&self) -> GroupScoring {
        self.scoring
    }

    /// The points of each test, in the order of the tests.
    pub fn points(&self) -> &[u32] {
        &self.points
    }

    /// The tests of the group, in order.
    pub fn tests(&self) -> &[TestDescriptor] {
        &self.tests
    }

    /// Access the tests for patching their metadata. The number of tests cannot change.
    pub fn tests_mut(&mut self) -> &mut [TestDescriptor] {
        &mut self.tests
    }

    /// The number of tests.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// An empty group is never sent to the service.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// The tests paired with their points, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&TestDescriptor, u32)> {
        self.tests.iter().zip(self.points.iter().copied())
    }
}

/// Split `score` among `count` tests.
///
/// With [`GroupScoring::Sum`] every test gets `score / count` points and the last
/// `score % count` tests get one extra point. With [`GroupScoring::AllOrNothing`] the first test
/// gets everything.
pub fn distribute_points(score: u32, count: usize, scoring: GroupScoring) -> Vec<u32> {
    if count == 0 {
        return vec![];
    }
    match scoring {
        GroupScoring::Sum => {
            let count_u32 = count as u32;
            let base = score / count_u32;
            let extra = (score % count_u32) as usize;
            let mut points = vec![base; count - extra];
            points.resize(count, base + 1);
            points
        }
        GroupScoring::AllOrNothing => {
            let mut points = vec![0; count];
            points[0] = score;
            points
        }
    }
}
