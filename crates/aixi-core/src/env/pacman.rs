//! A partially observable PacMan.
//!
//! The agent navigates a 19x17 maze, eating pellets while four ghosts roam.
//! Ghosts wander randomly until the player comes within Manhattan distance
//! 5, then pursue for 5 steps, then back off with a 2-step cooldown before
//! they may lock on again. The agent never sees the maze: its 16-bit
//! observation packs the local wall configuration, ghost and pellet
//! line-of-sight bits for the four cardinal directions, three "smell" bits
//! for pellets within Manhattan distance 2/3/4, and a power-pill flag.
//!
//! Per step the raw reward is -1 for the move, -10 for walking into a wall,
//! +10 per pellet, -50 for being caught, +100 for clearing the maze, all
//! applied to a +200 offset and clamped to [0, 309] (multiple ghosts can
//! reach the player in the same step, which would otherwise drive the sum
//! below the non-negative floor). The episode resets when the player is
//! caught or the maze is cleared; at the start of each episode every open
//! square independently holds a pellet with probability 1/2.
//!
//! Domain characteristics: `max_action = 3`, `max_observation = 65535`
//! (16 bits), `max_reward = 309`.

use tracing::debug;

use crate::env::Environment;
use crate::error::ConfigError;
use crate::options::Options;
use crate::{rng, Action, Percept};

const ROWS: usize = 19;
const COLS: usize = 17;

/// Maze template. `*` wall, `O` power pill, `x` warp tunnel mouth, letters
/// are ghost spawn points, `P` the player spawn.
const LAYOUT: [&str; ROWS] = [
    "                 ",
    " ** *** * *** ** ",
    "O               O",
    " ** * ***** * ** ",
    "    *   *   *    ",
    "*** *** * *** ***",
    "*** *       * ***",
    "*** * * AB* * ***",
    "x   * * CD* *   x",
    "*** * ***** * ***",
    "*** *       * ***",
    "*** * ***** * ***",
    "        P        ",
    " ** *** * *** ** ",
    "O *           * O",
    "* * * ***** * * *",
    "    *   *   *    ",
    " ****** * ****** ",
    "                 ",
];

/// Steps a ghost stays locked on after detecting the player.
const SNIFF_PURSUIT: i32 = 5;
/// Counter floor; a ghost may only re-acquire the player once its counter
/// has drained this far, giving a 2-step cooldown after each pursuit.
const SNIFF_FLOOR: i32 = -2;
/// Detection radius (Manhattan distance).
const SNIFF_RANGE: i32 = 5;

const MAX_REWARD: i64 = 309;

const GHOST_SPAWNS: [(i32, i32); 4] = [(8, 7), (9, 7), (8, 8), (9, 8)];
const GHOST_TAGS: [u8; 4] = [b'A', b'B', b'C', b'D'];
const PLAYER_SPAWN: (i32, i32) = (8, 12);

#[derive(Debug, Clone, Copy)]
struct Ghost {
    x: i32,
    y: i32,
    /// Pursuit countdown; see SNIFF_PURSUIT / SNIFF_FLOOR.
    sniff: i32,
    /// Whatever map character the ghost is standing on, restored when it
    /// moves away.
    covering: u8,
}

#[derive(Debug)]
pub struct PacMan {
    map: Vec<Vec<u8>>,
    player: (i32, i32),
    ghosts: [Ghost; 4],
    powered_up: bool,
    power_left: i32,
    pellet_count: u32,
    timestep: u64,
    resets: u64,
    episode_over: bool,
    /// Reward being accumulated for the current step, before the clamp.
    raw_reward: i64,
    action: Action,
    observation: Percept,
    reward: Percept,
}

impl PacMan {
    pub fn new(_options: &Options) -> Result<Self, ConfigError> {
        let mut env = Self {
            map: LAYOUT.iter().map(|row| row.bytes().collect()).collect(),
            player: PLAYER_SPAWN,
            ghosts: GHOST_SPAWNS.map(|(x, y)| Ghost {
                x,
                y,
                sniff: 0,
                covering: b' ',
            }),
            powered_up: false,
            power_left: 0,
            pellet_count: 0,
            timestep: 0,
            resets: 0,
            episode_over: false,
            raw_reward: 0,
            action: 0,
            observation: 0,
            reward: 0,
        };
        env.reset_episode();
        Ok(env)
    }

    fn at(&self, x: i32, y: i32) -> u8 {
        self.map[y as usize][x as usize]
    }

    fn set(&mut self, x: i32, y: i32, tile: u8) {
        self.map[y as usize][x as usize] = tile;
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        (0..COLS as i32).contains(&x) && (0..ROWS as i32).contains(&y)
    }

    fn is_ghost_tile(tile: u8) -> bool {
        GHOST_TAGS.contains(&tile)
    }

    fn manhattan(a: (i32, i32), b: (i32, i32)) -> i32 {
        (a.0 - b.0).abs() + (a.1 - b.1).abs()
    }

    /// (dx, dy) for action/direction 0 = up, 1 = right, 2 = down, 3 = left.
    fn offset(direction: u64) -> (i32, i32) {
        match direction {
            0 => (0, -1),
            1 => (1, 0),
            2 => (0, 1),
            _ => (-1, 0),
        }
    }

    fn move_player(&mut self, x: i32, y: i32) {
        self.raw_reward -= 1;
        let mut x = x;
        let mut valid_move = false;

        if !(0..COLS as i32).contains(&x) && y == 8 {
            // Warp tunnel: leave one side, appear on the other.
            x = if x < 0 { COLS as i32 - 1 } else { 0 };
            valid_move = true;
        } else if !Self::in_bounds(x, y) || self.at(x, y) == b'*' {
            self.raw_reward -= 10;
        } else if Self::is_ghost_tile(self.at(x, y)) {
            if self.powered_up {
                let tag = self.at(x, y);
                self.reset_ghost(tag);
            } else {
                self.raw_reward -= 50;
                self.episode_over = true;
            }
        } else if self.at(x, y) == b'.' {
            self.raw_reward += 10;
            self.pellet_count -= 1;
            if self.pellet_count == 0 {
                debug!(timestep = self.timestep, "maze cleared");
                self.raw_reward += 100;
                self.episode_over = true;
            }
            valid_move = true;
        } else if self.at(x, y) == b'O' {
            self.powered_up = true;
            self.power_left = 5;
            valid_move = true;
        } else if self.at(x, y) == b' ' || self.at(x, y) == b'x' {
            valid_move = true;
        }

        if valid_move {
            let (px, py) = self.player;
            let vacated = if (px == 0 || px == COLS as i32 - 1) && py == 8 {
                b'x'
            } else {
                b' '
            };
            self.set(px, py, vacated);
            self.set(x, y, b'P');
            self.player = (x, y);
        }

        if self.powered_up {
            self.power_left -= 1;
            self.powered_up = self.power_left > 0;
        }
    }

    /// One ghost turn: chase while the sniff counter is positive, re-acquire
    /// only once it has drained to the floor, decrement every step.
    fn ghost_step(&mut self, index: usize) {
        let ghost = self.ghosts[index];
        let chasing = if ghost.sniff > 0 {
            true
        } else if ghost.sniff <= SNIFF_FLOOR
            && Self::manhattan(self.player, (ghost.x, ghost.y)) <= SNIFF_RANGE
        {
            self.ghosts[index].sniff = SNIFF_PURSUIT;
            true
        } else {
            false
        };

        if chasing {
            self.ghost_pursuit_move(index);
        } else {
            self.ghost_random_move(index);
        }

        let ghost = &mut self.ghosts[index];
        ghost.sniff = (ghost.sniff - 1).max(SNIFF_FLOOR);
    }

    /// A ghost may enter any in-bounds square that is not a wall or another
    /// ghost.
    fn is_valid_ghost_move(&self, x: i32, y: i32) -> bool {
        Self::in_bounds(x, y) && self.at(x, y) != b'*' && !Self::is_ghost_tile(self.at(x, y))
    }

    /// Resolve a ghost stepping onto the player: eaten ghost or caught
    /// player, depending on the power pill.
    fn ghost_catches_player(&mut self, index: usize) {
        if self.powered_up {
            self.reset_ghost(GHOST_TAGS[index]);
        } else {
            self.raw_reward -= 50;
            self.episode_over = true;
        }
    }

    fn ghost_random_move(&mut self, index: usize) {
        let (gx, gy) = (self.ghosts[index].x, self.ghosts[index].y);
        let mut tried = [false; 4];

        let (new_x, new_y) = loop {
            let direction = rng::rand_range(4);
            let (dx, dy) = Self::offset(direction);
            let (nx, ny) = (gx + dx, gy + dy);
            tried[direction as usize] = true;

            if (nx, ny) == self.player {
                self.ghost_catches_player(index);
                return;
            }
            if self.is_valid_ghost_move(nx, ny) {
                break (nx, ny);
            }
            if tried.iter().all(|&t| t) {
                return; // boxed in; stay put
            }
        };

        self.relocate_ghost(index, new_x, new_y);
    }

    fn ghost_pursuit_move(&mut self, index: usize) {
        let (gx, gy) = (self.ghosts[index].x, self.ghosts[index].y);
        let current = Self::manhattan(self.player, (gx, gy));

        // Consider the four directions in fixed order, keeping the last one
        // that closes the distance.
        let mut target = None;
        for direction in 0..4 {
            let (dx, dy) = Self::offset(direction);
            let (nx, ny) = (gx + dx, gy + dy);
            if self.is_valid_ghost_move(nx, ny)
                && Self::manhattan(self.player, (nx, ny)) < current
            {
                target = Some((nx, ny));
            }
        }

        let Some((new_x, new_y)) = target else {
            // No closing move (a wall in the way); wander instead.
            self.ghost_random_move(index);
            return;
        };

        if (new_x, new_y) == self.player {
            self.ghost_catches_player(index);
            return;
        }

        self.relocate_ghost(index, new_x, new_y);
    }

    /// Move a ghost, restoring the tile it covered and picking up the one it
    /// lands on.
    fn relocate_ghost(&mut self, index: usize, x: i32, y: i32) {
        let ghost = self.ghosts[index];
        self.set(ghost.x, ghost.y, ghost.covering);
        self.ghosts[index].covering = self.at(x, y);
        self.ghosts[index].x = x;
        self.ghosts[index].y = y;
        self.set(x, y, GHOST_TAGS[index]);
    }

    /// Return an eaten ghost to its spawn point.
    fn reset_ghost(&mut self, tag: u8) {
        debug!(ghost = %(tag as char), "ghost eaten");
        let index = GHOST_TAGS.iter().position(|&t| t == tag).expect("known ghost tag");
        let ghost = self.ghosts[index];
        self.set(ghost.x, ghost.y, ghost.covering);

        let (sx, sy) = GHOST_SPAWNS[index];
        self.ghosts[index] = Ghost {
            x: sx,
            y: sy,
            sniff: 0,
            covering: b' ',
        };
        self.set(sx, sy, tag);
    }

    fn reset_episode(&mut self) {
        self.resets += 1;

        if self.resets > 1 {
            let (px, py) = self.player;
            self.set(px, py, b' ');
            for index in 0..4 {
                let ghost = self.ghosts[index];
                self.set(ghost.x, ghost.y, b' ');
            }
        }

        // Power pills back in their corners.
        for (x, y) in [(0, 2), (16, 2), (0, 14), (16, 14)] {
            self.set(x, y, b'O');
        }

        self.player = PLAYER_SPAWN;
        self.set(PLAYER_SPAWN.0, PLAYER_SPAWN.1, b'P');
        for index in 0..4 {
            let (sx, sy) = GHOST_SPAWNS[index];
            self.ghosts[index] = Ghost {
                x: sx,
                y: sy,
                sniff: 0,
                covering: b' ',
            };
            self.set(sx, sy, GHOST_TAGS[index]);
        }

        // Re-seed pellets: every open square holds one with probability 1/2.
        self.pellet_count = 0;
        for row in 0..ROWS {
            for col in 0..COLS {
                if (col == 0 || col == COLS - 1) && row == 8 {
                    self.map[row][col] = b'x';
                }
                if self.map[row][col] == b'.' {
                    self.map[row][col] = b' ';
                }
                if self.map[row][col] == b' ' && rng::rand_range(2) == 1 {
                    self.map[row][col] = b'.';
                    self.pellet_count += 1;
                }
            }
        }

        self.powered_up = false;
        self.power_left = 0;
        self.observation = 0;
        self.episode_over = false;
    }

    /// Pack the 16 observation bits; bit 0 of the array is the most
    /// significant bit of the value.
    fn update_observation(&mut self) {
        let (px, py) = self.player;
        let mut bits = [false; 16];

        // 0-3: walls adjacent to the player (up, right, down, left).
        bits[0] = py - 1 < 0 || self.at(px, py - 1) == b'*';
        bits[1] = px + 1 > COLS as i32 - 1 || self.at(px + 1, py) == b'*';
        bits[2] = py + 1 > ROWS as i32 - 1 || self.at(px, py + 1) == b'*';
        bits[3] = px - 1 < 0 || self.at(px - 1, py) == b'*';

        // 4-7: ghost in direct line of sight; 11-14: pellet likewise.
        // Only walls block sight.
        let rays: [(i32, i32, usize, usize); 4] = [
            (0, -1, 4, 11), // north
            (1, 0, 5, 12),  // east
            (0, 1, 6, 13),  // south
            (-1, 0, 7, 14), // west
        ];
        for (dx, dy, ghost_bit, pellet_bit) in rays {
            let (mut x, mut y) = (px + dx, py + dy);
            while x > 0 && x < COLS as i32 && y > 0 && y < ROWS as i32 && self.at(x, y) != b'*' {
                if Self::is_ghost_tile(self.at(x, y)) {
                    bits[ghost_bit] = true;
                }
                if self.at(x, y) == b'.' {
                    bits[pellet_bit] = true;
                }
                x += dx;
                y += dy;
            }
        }

        // 8-10: pellet "smell" within Manhattan distance 2, 3, 4.
        for row in 0..ROWS as i32 {
            for col in 0..COLS as i32 {
                if self.at(col, row) != b'.' {
                    continue;
                }
                let distance = Self::manhattan((px, py), (col, row));
                bits[8] |= distance <= 2;
                bits[9] |= distance <= 3;
                bits[10] |= distance <= 4;
            }
        }

        // 15: under the effect of a power pill.
        bits[15] = self.powered_up;

        self.observation = bits
            .iter()
            .enumerate()
            .filter(|(_, &bit)| bit)
            .map(|(i, _)| 1u64 << (15 - i))
            .sum();
    }
}

impl Environment for PacMan {
    fn perform_action(&mut self, action: Action) {
        debug_assert!(self.is_valid_action(action));
        self.timestep += 1;
        self.raw_reward = 200;

        let (dx, dy) = Self::offset(action);
        let (nx, ny) = (self.player.0 + dx, self.player.1 + dy);
        self.move_player(nx, ny);

        for index in 0..4 {
            self.ghost_step(index);
        }

        self.update_observation();
        self.action = action;
        self.reward = self.raw_reward.clamp(0, MAX_REWARD) as Percept;

        if self.episode_over {
            self.reset_episode();
        }
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
        (1 << 16) - 1
    }

    fn max_reward(&self) -> Percept {
        MAX_REWARD as Percept
    }

    fn describe(&self) -> String {
        let mut out = format!("timestep: {}, resets: {}\n", self.timestep, self.resets);
        for row in &self.map {
            out.push_str(std::str::from_utf8(row).unwrap_or("?"));
            out.push('\n');
        }
        out
    }
}
