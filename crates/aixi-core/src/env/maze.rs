//! A two-dimensional gridworld defined entirely by configuration.
//!
//! The agent moves in the four cardinal directions through a maze whose
//! layout, per-square rewards, and observation encoding all come from
//! options. Square types: `@` wall, `&` empty, `*` teleport destination,
//! `!` teleport trigger (entering one relocates the agent to a random `*`
//! square). The reward of a move is the reward of the square the agent
//! *attempted* to enter, wall or not; rewards are shifted so the minimum in
//! the maze maps to zero.
//!
//! Observation encodings (`maze-observation-encoding`):
//! - `uninformative`: a constant observation
//! - `walls`: a 4-bit mask of adjacent walls
//! - `coordinates`: `row * num_cols + col`
//!
//! Required options: `maze-num-rows`, `maze-num-cols`, and per-row
//! `maze-layout<i>` / `maze-rewards<i>` (1-based, rewards comma-separated).

use serde::{Deserialize, Serialize};

use crate::env::Environment;
use crate::error::ConfigError;
use crate::options::Options;
use crate::{rng, Action, Percept};

const LEFT: Action = 0;
const UP: Action = 1;
const RIGHT: Action = 2;
const DOWN: Action = 3;

const NULL_OBS: Percept = 0;
const LEFT_WALL: Percept = 1;
const UP_WALL: Percept = 2;
const RIGHT_WALL: Percept = 4;
const DOWN_WALL: Percept = 8;

const WALL: char = '@';
const TELEPORT_TO: char = '*';
const TELEPORT_FROM: char = '!';

/// How the agent's position is reported back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationEncoding {
    Uninformative,
    Walls,
    Coordinates,
}

#[derive(Debug)]
pub struct Maze {
    layout: Vec<Vec<char>>,
    rewards: Vec<Vec<Percept>>,
    num_rows: usize,
    num_cols: usize,
    encoding: ObservationEncoding,
    max_reward: Percept,
    row: usize,
    col: usize,
    teleported: bool,
    wall_collision: bool,
    action: Action,
    observation: Percept,
    reward: Percept,
}

impl Maze {
    pub fn new(options: &Options) -> Result<Self, ConfigError> {
        let num_rows: usize = options.require("maze-num-rows")?;
        let num_cols: usize = options.require("maze-num-cols")?;
        if num_rows == 0 || num_cols == 0 {
            return Err(ConfigError::InvalidValue {
                key: "maze-num-rows".to_string(),
                value: format!("{num_rows}x{num_cols}"),
                reason: "maze dimensions must be positive".to_string(),
            });
        }

        let encoding = match options.raw("maze-observation-encoding").unwrap_or("uninformative") {
            "uninformative" => ObservationEncoding::Uninformative,
            "walls" => ObservationEncoding::Walls,
            "coordinates" => ObservationEncoding::Coordinates,
            other => return Err(ConfigError::UnknownMazeEncoding(other.to_string())),
        };

        let mut layout = Vec::with_capacity(num_rows);
        let mut raw_rewards: Vec<Vec<i64>> = Vec::with_capacity(num_rows);
        let mut teleport_possible = false;
        let mut min_reward = i64::MAX;
        let mut max_reward = i64::MIN;

        for r in 0..num_rows {
            let layout_key = format!("maze-layout{}", r + 1);
            let layout_row: Vec<char> = options.require::<String>(&layout_key)?.chars().collect();
            if layout_row.len() != num_cols {
                return Err(ConfigError::MazeRowLength {
                    row: r + 1,
                    expected: num_cols,
                    found: layout_row.len(),
                });
            }

            let rewards_key = format!("maze-rewards{}", r + 1);
            let rewards_raw: String = options.require::<String>(&rewards_key)?;
            let mut rewards_row = Vec::with_capacity(num_cols);
            for field in rewards_raw.split(',') {
                let value: i64 = field.parse().map_err(|_| ConfigError::InvalidValue {
                    key: rewards_key.clone(),
                    value: field.to_string(),
                    reason: "expected an integer reward".to_string(),
                })?;
                rewards_row.push(value);
            }
            if rewards_row.len() != num_cols {
                return Err(ConfigError::MazeRowLength {
                    row: r + 1,
                    expected: num_cols,
                    found: rewards_row.len(),
                });
            }

            for (c, &value) in rewards_row.iter().enumerate() {
                if layout_row[c] == TELEPORT_TO {
                    teleport_possible = true;
                }
                min_reward = min_reward.min(value);
                max_reward = max_reward.max(value);
            }

            layout.push(layout_row);
            raw_rewards.push(rewards_row);
        }

        // The agent must be able to start (and re-enter) somewhere.
        if !teleport_possible {
            return Err(ConfigError::MazeWithoutTeleport);
        }

        // Shift rewards so they begin at zero.
        let rewards = raw_rewards
            .into_iter()
            .map(|row| row.into_iter().map(|v| (v - min_reward) as Percept).collect())
            .collect();

        let mut env = Self {
            layout,
            rewards,
            num_rows,
            num_cols,
            encoding,
            max_reward: (max_reward - min_reward) as Percept,
            row: 0,
            col: 0,
            teleported: false,
            wall_collision: false,
            action: LEFT,
            observation: NULL_OBS,
            reward: 0,
        };
        env.teleport_agent();
        env.reward = 0;
        env.calculate_observation();
        Ok(env)
    }

    /// Drop the agent on a random teleport destination square.
    fn teleport_agent(&mut self) {
        self.teleported = true;
        loop {
            self.row = rng::rand_range(self.num_rows as u64) as usize;
            self.col = rng::rand_range(self.num_cols as u64) as usize;
            if self.layout[self.row][self.col] == TELEPORT_TO {
                break;
            }
        }
    }

    fn is_wall(&self, row: usize, col: usize) -> bool {
        self.layout[row][col] == WALL
    }

    fn calculate_observation(&mut self) {
        self.observation = match self.encoding {
            ObservationEncoding::Uninformative => NULL_OBS,
            ObservationEncoding::Walls => {
                let mut observation = 0;
                if self.col == 0 || self.is_wall(self.row, self.col - 1) {
                    observation += LEFT_WALL;
                }
                if self.row == 0 || self.is_wall(self.row - 1, self.col) {
                    observation += UP_WALL;
                }
                if self.col + 1 == self.num_cols || self.is_wall(self.row, self.col + 1) {
                    observation += RIGHT_WALL;
                }
                if self.row + 1 == self.num_rows || self.is_wall(self.row + 1, self.col) {
                    observation += DOWN_WALL;
                }
                observation
            }
            ObservationEncoding::Coordinates => (self.row * self.num_cols + self.col) as Percept,
        };
    }
}

impl Environment for Maze {
    fn perform_action(&mut self, action: Action) {
        debug_assert!(self.is_valid_action(action));
        self.action = action;
        self.teleported = false;
        self.wall_collision = false;

        // The square the agent attempts to enter, clamped to the maze.
        let row_delta: i64 = match action {
            UP => -1,
            DOWN => 1,
            _ => 0,
        };
        let col_delta: i64 = match action {
            LEFT => -1,
            RIGHT => 1,
            _ => 0,
        };
        let row_to = (self.row as i64 + row_delta).clamp(0, self.num_rows as i64 - 1) as usize;
        let col_to = (self.col as i64 + col_delta).clamp(0, self.num_cols as i64 - 1) as usize;

        self.wall_collision = self.is_wall(row_to, col_to);
        if !self.wall_collision {
            self.row = row_to;
            self.col = col_to;
        }

        if self.layout[self.row][self.col] == TELEPORT_FROM {
            self.teleport_agent();
        }

        // The reward is for the *attempted* square, reached or not, and
        // precedes any teleportation.
        self.reward = self.rewards[row_to][col_to];
        self.calculate_observation();
    }

    fn observation(&self) -> Percept {
        self.observation
    }

    fn reward(&self) -> Percept {
        self.reward
    }

    fn max_action(&self) -> Action {
        3
    }

    fn max_observation(&self) -> Percept {
        match self.encoding {
            ObservationEncoding::Uninformative => NULL_OBS,
            ObservationEncoding::Walls => LEFT_WALL + UP_WALL + RIGHT_WALL + DOWN_WALL,
            ObservationEncoding::Coordinates => (self.num_rows * self.num_cols - 1) as Percept,
        }
    }

    fn max_reward(&self) -> Percept {
        self.max_reward
    }

    fn describe(&self) -> String {
        let mut out = format!(
            "row = {}, col = {}, observation = {}, reward = {}{}{}\n",
            self.row,
            self.col,
            self.observation,
            self.reward,
            if self.teleported { ", teleported" } else { "" },
            if self.wall_collision { ", wall collision" } else { "" },
        );
        for (r, row) in self.layout.iter().enumerate() {
            for (c, &square) in row.iter().enumerate() {
                out.push(if r == self.row && c == self.col { 'A' } else { square });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The four-by-four cheese maze: walls around a corridor loop, cheese in
    /// one corner.
    fn cheese_maze() -> Options {
        let mut options = Options::new();
        options.parse_lines(
            "maze-num-rows=4\n\
             maze-num-cols=4\n\
             maze-layout1=@@@@\n\
             maze-layout2=@*!@\n\
             maze-layout3=@*@@\n\
             maze-layout4=@@@@\n\
             maze-rewards1=0,0,0,0\n\
             maze-rewards2=0,-1,10,0\n\
             maze-rewards3=0,-1,0,0\n\
             maze-rewards4=0,0,0,0\n\
             maze-observation-encoding=walls\n",
        );
        options
    }

    #[test]
    fn rewards_are_shifted_to_zero_minimum() {
        crate::rng::seed(0);
        let env = Maze::new(&cheese_maze()).unwrap();
        // Raw range [-1, 10] becomes [0, 11].
        assert_eq!(env.max_reward(), 11);
    }

    #[test]
    fn walls_block_and_still_pay_the_attempted_square() {
        crate::rng::seed(0);
        let mut env = Maze::new(&cheese_maze()).unwrap();
        // Force a known position: walk left until boxed into (1,1) or (2,1).
        env.perform_action(LEFT);
        let (row, col) = (env.row, env.col);
        env.perform_action(LEFT);
        assert!(env.wall_collision);
        assert_eq!((env.row, env.col), (row, col));
        // The wall square's shifted reward (raw 0 becomes 1).
        assert_eq!(env.reward(), 1);
    }

    #[test]
    fn wall_observation_reflects_the_layout() {
        crate::rng::seed(0);
        let mut env = Maze::new(&cheese_maze()).unwrap();
        env.row = 2;
        env.col = 1;
        env.calculate_observation();
        // (2,1) has walls left, right and below, corridor above.
        assert_eq!(env.observation(), LEFT_WALL + RIGHT_WALL + DOWN_WALL);
    }

    #[test]
    fn teleport_square_relocates_the_agent() {
        crate::rng::seed(1);
        let mut env = Maze::new(&cheese_maze()).unwrap();
        env.row = 1;
        env.col = 1;
        env.perform_action(RIGHT); // into the '!' square
        assert!(env.teleported);
        assert_eq!(env.layout[env.row][env.col], TELEPORT_TO);
        // Reward is for the attempted '!' square: raw 10 becomes 11.
        assert_eq!(env.reward(), 11);
    }

    #[test]
    fn requires_a_teleport_destination() {
        let mut options = Options::new();
        options.parse_lines(
            "maze-num-rows=1\nmaze-num-cols=2\nmaze-layout1=&&\nmaze-rewards1=0,0\n",
        );
        assert!(matches!(
            Maze::new(&options).unwrap_err(),
            ConfigError::MazeWithoutTeleport
        ));
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut options = cheese_maze();
        options.set("maze-layout2", "@*@");
        assert!(matches!(
            Maze::new(&options).unwrap_err(),
            ConfigError::MazeRowLength { .. }
        ));
    }

    #[test]
    fn coordinate_encoding_reports_position() {
        let mut options = cheese_maze();
        options.set("maze-observation-encoding", "coordinates");
        crate::rng::seed(0);
        let env = Maze::new(&options).unwrap();
        assert_eq!(env.observation(), (env.row * 4 + env.col) as Percept);
        assert_eq!(env.max_observation(), 15);
    }

    #[test]
    fn unknown_encoding_is_a_config_error() {
        let mut options = cheese_maze();
        options.set("maze-observation-encoding", "sonar");
        assert!(matches!(
            Maze::new(&options).unwrap_err(),
            ConfigError::UnknownMazeEncoding(_)
        ));
    }
}
