//! Cosmetic brick explosion. Purely visual; no game state depends on it.

use std::f64::consts::PI;
use std::time::Duration;

/// Logical playfield width the renderer scales to the terminal
pub const FIELD_WIDTH: f64 = 450.0;
/// Logical brick size
pub const BRICK_WIDTH: f64 = 100.0;
pub const BRICK_HEIGHT: f64 = 40.0;

pub const PIECES: usize = 8;
pub const FRAMES: u32 = 30;
pub const FRAME_INTERVAL: Duration = Duration::from_millis(50);
const PIECE_SPEED: f64 = 3.0;

/// One fragment flying away from the brick centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    pub x: f64,
    pub y: f64,
    vel_x: f64,
    vel_y: f64,
}

impl Piece {
    fn new(x: f64, y: f64, angle: f64) -> Self {
        Self {
            x,
            y,
            vel_x: angle.cos() * PIECE_SPEED,
            vel_y: angle.sin() * PIECE_SPEED,
        }
    }

    fn update(&mut self) {
        self.x += self.vel_x;
        self.y += self.vel_y;
    }
}

#[derive(Debug, Clone)]
pub struct Explosion {
    pub pieces: Vec<Piece>,
    pub frame: u32,
}

impl Explosion {
    /// Burst centred on a brick whose top edge sits at `brick_top`
    pub fn at_brick(brick_top: f64) -> Self {
        let center_x = FIELD_WIDTH / 2.0;
        let center_y = brick_top + BRICK_HEIGHT / 2.0;
        let pieces = (0..PIECES)
            .map(|i| Piece::new(center_x, center_y, i as f64 * 2.0 * PI / PIECES as f64))
            .collect();
        Self { pieces, frame: 0 }
    }

    /// Advance one frame. Returns false once the animation is over.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.frame += 1;
        self.pieces.iter_mut().for_each(Piece::update);
        !self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= FRAMES
    }

    /// 1.0 when fresh, fading linearly to 0.0
    pub fn fade(&self) -> f64 {
        1.0 - f64::from(self.frame.min(FRAMES)) / f64::from(FRAMES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_into_eight_pieces_around_the_centre() {
        let explosion = Explosion::at_brick(100.0);
        assert_eq!(explosion.pieces.len(), PIECES);
        for piece in &explosion.pieces {
            assert_eq!(piece.x, FIELD_WIDTH / 2.0);
            assert_eq!(piece.y, 120.0);
        }
        assert_eq!(explosion.fade(), 1.0);
    }

    #[test]
    fn pieces_move_outward() {
        let mut explosion = Explosion::at_brick(0.0);
        explosion.step();
        let first = explosion.pieces[0];
        assert!((first.x - (FIELD_WIDTH / 2.0 + PIECE_SPEED)).abs() < 1e-9);
        assert!((first.y - BRICK_HEIGHT / 2.0).abs() < 1e-9);
    }

    #[test]
    fn finishes_after_fixed_frames() {
        let mut explosion = Explosion::at_brick(0.0);
        let mut steps = 0;
        while explosion.step() {
            steps += 1;
        }
        assert_eq!(steps, FRAMES - 1);
        assert!(explosion.is_finished());
        assert_eq!(explosion.fade(), 0.0);
        assert!(!explosion.step());
        assert_eq!(explosion.frame, FRAMES);
    }
}
