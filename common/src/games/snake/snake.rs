use std::collections::VecDeque;

use super::types::{Direction, Point};

/// Ordered body segments, head first. The body is never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Snake {
    body: VecDeque<Point>,
}

impl Snake {
    pub fn new(start_pos: Point) -> Self {
        Self {
            body: VecDeque::from([start_pos]),
        }
    }

    /// Builds a snake from explicit segments, head first. Falls back to `fallback` when empty.
    pub fn from_segments(segments: impl IntoIterator<Item = Point>, fallback: Point) -> Self {
        let body: VecDeque<Point> = segments.into_iter().collect();
        if body.is_empty() {
            return Self::new(fallback);
        }
        Self { body }
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn tail(&self) -> Point {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Point> {
        self.body.iter()
    }

    pub fn contains(&self, point: Point) -> bool {
        self.body.contains(&point)
    }

    pub fn next_head(&self, direction: Direction) -> Point {
        self.head().offset(direction)
    }

    fn push_head(&mut self, head: Point) {
        self.body.push_front(head);
    }

    fn drop_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }

    /// Moves onto `new_head`; the tail stays when food was eaten.
    pub fn grow_or_shrink(&mut self, new_head: Point, ate_food: bool) {
        self.push_head(new_head);
        if !ate_food {
            self.drop_tail();
        }
    }

    /// Stacks `count` extra segments on the tail; they unfold as the snake moves.
    pub fn apply_growth_bonus(&mut self, count: usize) {
        let tail = self.tail();
        self.body.extend(std::iter::repeat_n(tail, count));
    }

    pub fn apply_tail_reduction(&mut self, min_length: usize, remove_count: usize) {
        if self.body.len() > min_length {
            let new_len = self.body.len().saturating_sub(remove_count).max(1);
            self.body.truncate(new_len);
        }
    }
}
