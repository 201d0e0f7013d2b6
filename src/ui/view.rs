//! Base view state shared by every widget

use std::rc::Rc;

use macroquad::math::{Rect, Vec2};

use crate::atlas::Frame;
use crate::pool::Poolable;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewArgs {
    pub position: Vec2,
    pub size: Vec2,
}

impl ViewArgs {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }
}

/// Position, size, opacity and the frame a view draws
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub position: Vec2,
    pub size: Vec2,
    pub alpha: f32,
    pub visible: bool,
    pub frame: Option<Rc<Frame>>,
}

impl ViewState {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.visible && self.bounds().contains(point)
    }
}

impl Poolable for ViewState {
    type Args = ViewArgs;

    fn reuse(&mut self, args: ViewArgs) {
        self.position = args.position;
        self.size = args.size;
        self.alpha = 1.0;
        self.visible = true;
        self.frame = None;
    }

    fn clear_data(&mut self) {
        self.position = Vec2::ZERO;
        self.size = Vec2::ZERO;
        self.alpha = 0.0;
        self.visible = false;
        self.frame = None;
    }
}
