// Container state stack
// One frame per open block or inline container; the top frame says where on
// the page we are and in which style text is set.

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::markdown_ast::ListKind;
use crate::theme::Styler;

/// Deepest nesting the renderer accepts.
pub const MAX_DEPTH: usize = 256;

const MARGIN_EPSILON: f64 = 1e-6;

/// Layout and formatting context of one nesting level.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerState {
    pub style: Styler,
    /// `None` outside of lists.
    pub list_kind: Option<ListKind>,
    pub left_margin: f64,
    /// Where item content starts once the bullet has been drawn.
    pub content_left_margin: f64,
    pub item_number: u64,
    pub first_paragraph: bool,
    pub is_header: bool,
    /// Text collected while inside a table cell.
    pub cell_buffer: Option<String>,
    /// Style of the last text added to `cell_buffer`.
    pub cell_style: Option<Styler>,
    /// Target of the enclosing link, if any.
    pub destination: Option<String>,

    counter_backup: Option<u64>,
    saved_left_margin: f64,
}

impl ContainerState {
    pub fn new(style: Styler, left_margin: f64) -> Self {
        ContainerState {
            style,
            list_kind: None,
            left_margin,
            content_left_margin: left_margin,
            item_number: 0,
            first_paragraph: false,
            is_header: false,
            cell_buffer: None,
            cell_style: None,
            destination: None,
            counter_backup: None,
            saved_left_margin: left_margin,
        }
    }

    /// A frame at the same left margin as `parent`.
    pub fn child_of(parent: &ContainerState, style: Styler) -> Self {
        Self::new(style, parent.left_margin)
    }

    pub fn with_list_kind(mut self, kind: ListKind) -> Self {
        self.list_kind = Some(kind);
        self
    }

    pub fn with_header(mut self, is_header: bool) -> Self {
        self.is_header = is_header;
        self
    }

    pub fn with_destination(mut self, destination: Option<String>) -> Self {
        self.destination = destination;
        self
    }

    /// Start buffering text instead of drawing it.
    pub fn buffering(mut self) -> Self {
        self.cell_buffer = Some(String::new());
        self
    }

    /// Canvas left margin at the moment this frame was pushed.
    pub fn saved_left_margin(&self) -> f64 {
        self.saved_left_margin
    }
}

/// Vector-backed frame stack with a root frame that can never be popped.
#[derive(Debug)]
pub struct ContainerStack {
    root: ContainerState,
    frames: Vec<ContainerState>,
    ordered_counter: u64,
}

impl ContainerStack {
    pub fn new(root: ContainerState) -> Self {
        ContainerStack {
            root,
            frames: Vec::new(),
            ordered_counter: 0,
        }
    }

    /// Number of frames, root included; never below 1.
    pub fn depth(&self) -> usize {
        self.frames.len() + 1
    }

    pub fn peek(&self) -> &ContainerState {
        self.frames.last().unwrap_or(&self.root)
    }

    pub fn peek_mut(&mut self) -> &mut ContainerState {
        match self.frames.last_mut() {
            Some(frame) => frame,
            None => &mut self.root,
        }
    }

    /// Push a frame, remembering the canvas margin so `pop` can restore it.
    ///
    /// Ordered list frames also save the running item counter.
    pub fn push(&mut self, mut frame: ContainerState, canvas: &dyn Canvas) -> Result<()> {
        if self.depth() >= MAX_DEPTH {
            return Err(Error::StackOverflow(self.depth() + 1));
        }
        let parent_margin = self.peek().left_margin;
        if frame.left_margin + MARGIN_EPSILON < parent_margin {
            return Err(Error::MarginRegression {
                child: frame.left_margin,
                parent: parent_margin,
            });
        }
        frame.saved_left_margin = canvas.left_margin();
        if frame.list_kind == Some(ListKind::Ordered) {
            frame.counter_backup = Some(self.ordered_counter);
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pop the top frame and restore the canvas margin and ordered counter.
    pub fn pop(&mut self, canvas: &mut dyn Canvas) -> Result<ContainerState> {
        let frame = self.frames.pop().ok_or(Error::StackUnderflow)?;
        canvas.set_left_margin(frame.saved_left_margin);
        if let Some(backup) = frame.counter_backup {
            self.ordered_counter = backup;
        }
        Ok(frame)
    }

    /// Running number of the innermost ordered list.
    pub fn ordered_counter(&self) -> u64 {
        self.ordered_counter
    }

    pub fn set_ordered_counter(&mut self, value: u64) {
        self.ordered_counter = value;
    }

    /// Advance the ordered counter and return the new item number.
    pub fn next_ordered(&mut self) -> u64 {
        self.ordered_counter += 1;
        self.ordered_counter
    }

    /// Innermost frame that buffers cell text.
    pub fn cell_frame_mut(&mut self) -> Option<&mut ContainerState> {
        self.frames
            .iter_mut()
            .rev()
            .find(|frame| frame.cell_buffer.is_some())
    }

    pub fn in_cell(&self) -> bool {
        self.frames.iter().any(|frame| frame.cell_buffer.is_some())
    }

    /// Whether any open frame belongs to a list.
    pub fn in_list(&self) -> bool {
        self.frames.iter().any(|frame| frame.list_kind.is_some())
    }
}
