use std::collections::{HashSet, VecDeque};

use uuid::Uuid;

use crate::model::{
    AnimationConfig, Breakpoint, BreakpointLayout, GridConfig, GridPosition, HoverEffect,
    ResponsiveLayout, WidgetConfig, WidgetId, WidgetLayoutConfig,
};

/// Grid placement and collision arbitration for one editing surface.
///
/// The engine is stateless with respect to widgets: every operation takes the
/// current collection as an explicit parameter and mutates the passed-in
/// objects. Only the [`GridConfig`] lives here. No operation panics or
/// errors; a widget without a layout is the single failure condition and is
/// signalled with `false`/no-op.
#[derive(Debug, Clone)]
pub struct GridEngine {
    pub(crate) grid: GridConfig,
}

impl Default for GridEngine {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl GridEngine {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid: sanitize(grid),
        }
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    pub fn update_grid(&mut self, grid: GridConfig) {
        self.grid = sanitize(grid);
    }

    /// Give a freshly created widget its default layout. Idempotent: a widget
    /// that already carries a layout is left untouched.
    ///
    /// Placement ignores the rest of the collection; new widgets start at the
    /// first cell and later moves resolve any resulting overlap.
    pub fn initialize_widget_layout(&self, widget: &mut WidgetConfig) {
        if widget.layout.is_some() {
            return;
        }
        let defaults = WidgetLayoutConfig::default();
        let position = self.find_next_available_position(&[], defaults.column_span);
        widget.layout = Some(WidgetLayoutConfig {
            column: position.column,
            row: position.row,
            ..defaults
        });
    }

    /// Scan rows top-down and columns left-to-right for the first slot where
    /// `span_width` consecutive cells are free. The scan is unbounded in row
    /// count: it always finds a slot past the last occupied row.
    pub fn find_next_available_position(
        &self,
        existing: &[WidgetConfig],
        span_width: u16,
    ) -> GridPosition {
        if existing.is_empty() {
            return GridPosition { column: 1, row: 1 };
        }

        let span = span_width.clamp(1, self.grid.columns);
        let max_start = self.grid.columns - span + 1;
        let occupied = occupied_cells(existing);

        let mut row: u32 = 1;
        loop {
            for column in 1..=max_start {
                if (column..column + span).all(|cell| !occupied.contains(&(row, cell))) {
                    return GridPosition {
                        column,
                        row: row.min(u16::MAX as u32) as u16,
                    };
                }
            }
            row += 1;
        }
    }

    /// Whether `widget` could sit at the target cell without leaving the grid
    /// or overlapping another widget's footprint. The widget itself is
    /// excluded from the overlap check by id.
    pub fn can_place_widget(
        &self,
        widget: &WidgetConfig,
        column: u16,
        row: u16,
        others: &[WidgetConfig],
    ) -> bool {
        let Some(layout) = widget.layout.as_ref() else {
            return false;
        };
        if column < 1 || row < 1 {
            return false;
        }
        if column as u32 + layout.column_span as u32 - 1 > self.grid.columns as u32 {
            return false;
        }
        for other in others {
            if other.id == widget.id {
                continue;
            }
            let Some(theirs) = other.layout.as_ref() else {
                continue;
            };
            if rects_collide(
                column,
                row,
                layout.column_span,
                layout.row_span,
                theirs.column,
                theirs.row,
                theirs.column_span,
                theirs.row_span,
            ) {
                return false;
            }
        }
        true
    }

    /// Write a new position into the widget's layout, clamped so the widget
    /// stays inside the grid. Returns `false` only when the widget has no
    /// layout yet.
    pub fn move_widget(&self, widget: &mut WidgetConfig, column: u16, row: u16) -> bool {
        let Some(layout) = widget.layout.as_mut() else {
            return false;
        };
        let max_start = self
            .grid
            .columns
            .saturating_sub(layout.column_span)
            .saturating_add(1)
            .max(1);
        layout.column = column.clamp(1, max_start);
        layout.row = row.max(1);
        true
    }

    /// Move a widget within a collection and displace whatever now overlaps
    /// it. Returns `false` when the widget is missing or has no layout.
    pub fn move_widget_in(
        &self,
        widgets: &mut [WidgetConfig],
        id: &str,
        column: u16,
        row: u16,
    ) -> bool {
        let Some(widget) = widgets.iter_mut().find(|w| w.id == id) else {
            return false;
        };
        if !self.move_widget(widget, column, row) {
            return false;
        }
        self.resolve_collisions(widgets, id);
        true
    }

    /// Push every widget colliding with `moved_id` directly below it, then
    /// propagate to whatever those displacements newly collide with. Returns
    /// the number of displacements performed.
    ///
    /// Runs as an explicit worklist: each displacement re-enqueues the
    /// displaced widget as a mover. Rows only ever grow, and an iteration
    /// budget bounds pathological cyclic overlap input; when the budget runs
    /// out the remaining geometry is left as-is. Auto-height widgets neither
    /// displace nor get displaced.
    pub fn resolve_collisions(&self, widgets: &mut [WidgetConfig], moved_id: &str) -> usize {
        let Some(moved) = widgets.iter().find(|w| w.id == moved_id) else {
            return 0;
        };
        if moved.layout.as_ref().is_none_or(|l| l.auto_height) {
            return 0;
        }

        let mut displaced = 0;
        let mut queue: VecDeque<WidgetId> = VecDeque::new();
        queue.push_back(moved_id.to_string());
        let mut budget = widgets
            .len()
            .saturating_mul(widgets.len())
            .saturating_add(8);

        while let Some(mover_id) = queue.pop_front() {
            let Some((m_col, m_row, m_span, m_rows)) = footprint_of(widgets, &mover_id) else {
                continue;
            };
            let push_to = (m_row as u32 + m_rows as u32).min(u16::MAX as u32) as u16;

            let mut colliders: Vec<usize> = widgets
                .iter()
                .enumerate()
                .filter(|(_, w)| w.id != mover_id)
                .filter(|(_, w)| {
                    w.layout.as_ref().is_some_and(|l| {
                        !l.auto_height
                            && rects_collide(
                                m_col,
                                m_row,
                                m_span,
                                m_rows,
                                l.column,
                                l.row,
                                l.column_span,
                                l.row_span,
                            )
                    })
                })
                .map(|(idx, _)| idx)
                .collect();
            colliders.sort_by_key(|&idx| widgets[idx].layout.as_ref().map_or(0, |l| l.row));

            for idx in colliders {
                if budget == 0 {
                    return displaced;
                }
                budget -= 1;
                if let Some(layout) = widgets[idx].layout.as_mut() {
                    layout.row = push_to;
                }
                displaced += 1;
                queue.push_back(widgets[idx].id.clone());
            }
        }

        displaced
    }

    /// Resize, clamping the column span to what fits right of the widget's
    /// column. Does not run collision resolution; that is the caller's call.
    pub fn resize_widget(&self, widget: &mut WidgetConfig, column_span: u16, row_span: u16) -> bool {
        let Some(layout) = widget.layout.as_mut() else {
            return false;
        };
        let max_span = self
            .grid
            .columns
            .saturating_sub(layout.column)
            .saturating_add(1)
            .max(1);
        layout.column_span = column_span.clamp(1, max_span);
        layout.row_span = row_span.max(1);
        true
    }

    /// Enabling pins the widget to column 1 across the full grid width.
    /// Disabling only clears the flag; the previous column and span are not
    /// restored.
    pub fn set_full_width(&self, widget: &mut WidgetConfig, full_width: bool) -> bool {
        let Some(layout) = widget.layout.as_mut() else {
            return false;
        };
        layout.full_width = full_width;
        if full_width {
            layout.column = 1;
            layout.column_span = self.grid.columns;
        }
        true
    }

    /// Slide widgets upward, in (row, column) order, until each hits either
    /// row 1 or another already-compacted widget. Mutates the collection in
    /// place.
    pub fn compact_grid(&self, widgets: &mut [WidgetConfig]) {
        let mut order: Vec<usize> = (0..widgets.len())
            .filter(|&idx| widgets[idx].layout.is_some())
            .collect();
        order.sort_by_key(|&idx| {
            widgets[idx]
                .layout
                .as_ref()
                .map_or((u16::MAX, u16::MAX), |l| (l.row, l.column))
        });

        let mut compacted: Vec<WidgetConfig> = Vec::with_capacity(order.len());
        for idx in order {
            let (column, mut row) = match widgets[idx].layout.as_ref() {
                Some(l) => (l.column, l.row),
                None => continue,
            };
            while row > 1 && self.can_place_widget(&widgets[idx], column, row - 1, &compacted) {
                row -= 1;
            }
            if let Some(layout) = widgets[idx].layout.as_mut() {
                layout.row = row;
            }
            compacted.push(widgets[idx].clone());
        }
    }

    /// Deep copy with a fresh id, placed at the next free slot sized to the
    /// clone's span.
    pub fn clone_widget(&self, widget: &WidgetConfig, others: &[WidgetConfig]) -> WidgetConfig {
        let mut clone = widget.clone();
        clone.id = Uuid::new_v4().to_string();
        if let Some(layout) = clone.layout.as_mut() {
            let position = self.find_next_available_position(others, layout.column_span);
            layout.column = position.column;
            layout.row = position.row;
        }
        clone
    }

    /// Backfill the layout, responsive, and animation defaults a widget needs
    /// before the layout-settings surface can bind to it. This is the one
    /// place already-placed widgets pick up defaults.
    pub fn backfill_layout_defaults(&self, widget: &mut WidgetConfig) {
        self.initialize_widget_layout(widget);
        let columns = self.grid.columns;
        let Some(layout) = widget.layout.as_mut() else {
            return;
        };
        let span = layout.column_span;
        let responsive = layout.responsive.get_or_insert_with(ResponsiveLayout::default);
        if responsive.mobile.is_none() {
            responsive.mobile = Some(breakpoint_default(columns));
        }
        if responsive.tablet.is_none() {
            responsive.tablet = Some(breakpoint_default((columns / 2).max(1)));
        }
        if responsive.desktop.is_none() {
            responsive.desktop = Some(breakpoint_default(span));
        }
        if layout.animation.is_none() {
            layout.animation = Some(AnimationConfig::default());
        }
        if layout.hover_effect.is_none() {
            layout.hover_effect = Some(HoverEffect::default());
        }
    }

    /// Resolve the layout a breakpoint should render with, falling back to
    /// the backfill defaults when no override is stored.
    pub fn effective_breakpoint_layout(
        &self,
        widget: &WidgetConfig,
        breakpoint: Breakpoint,
    ) -> Option<BreakpointLayout> {
        let layout = widget.layout.as_ref()?;
        if let Some(stored) = layout.responsive.as_ref().and_then(|r| r.get(breakpoint)) {
            return Some(stored);
        }
        let column_span = match breakpoint {
            Breakpoint::Mobile => self.grid.columns,
            Breakpoint::Tablet => (self.grid.columns / 2).max(1),
            Breakpoint::Desktop => layout.column_span,
        };
        Some(breakpoint_default(column_span))
    }
}

/// Axis-aligned overlap test over 1-based cell rectangles: two footprints
/// collide unless one sits entirely left of, right of, above, or below the
/// other.
pub fn rects_collide(
    col_a: u16,
    row_a: u16,
    span_a: u16,
    rows_a: u16,
    col_b: u16,
    row_b: u16,
    span_b: u16,
    rows_b: u16,
) -> bool {
    let a_left_of_b = col_a as u32 + span_a as u32 <= col_b as u32;
    let b_left_of_a = col_b as u32 + span_b as u32 <= col_a as u32;
    let a_above_b = row_a as u32 + rows_a as u32 <= row_b as u32;
    let b_above_a = row_b as u32 + rows_b as u32 <= row_a as u32;
    !(a_left_of_b || b_left_of_a || a_above_b || b_above_a)
}

fn sanitize(grid: GridConfig) -> GridConfig {
    GridConfig {
        columns: grid.columns.max(1),
        ..grid
    }
}

fn breakpoint_default(column_span: u16) -> BreakpointLayout {
    BreakpointLayout {
        column_span,
        order: 0,
        hidden: false,
    }
}

fn occupied_cells(widgets: &[WidgetConfig]) -> HashSet<(u32, u16)> {
    let mut cells = HashSet::new();
    for widget in widgets {
        let Some(layout) = widget.layout.as_ref() else {
            continue;
        };
        for row in layout.row as u32..layout.row as u32 + layout.row_span as u32 {
            for column in layout.column..layout.column.saturating_add(layout.column_span) {
                cells.insert((row, column));
            }
        }
    }
    cells
}

fn footprint_of(widgets: &[WidgetConfig], id: &str) -> Option<(u16, u16, u16, u16)> {
    widgets
        .iter()
        .find(|w| w.id == id)
        .and_then(|w| w.layout.as_ref())
        .map(|l| (l.column, l.row, l.column_span, l.row_span))
}
