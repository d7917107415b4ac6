use crate::logic::board::{Board, Piece, Side};
use std::collections::{HashMap, VecDeque};

/// Index of a node inside its [`MoveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: Self = Self(0);

    pub const fn index(self) -> usize {
        self.0
    }
}

/// One landing square of a move.
///
/// A node with `jump_over` set was reached by capturing that piece. A
/// non-root node without it is a plain one-step move and never has children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceMove {
    pub row: usize,
    pub col: usize,
    pub jump_over: Option<Piece>,
    pub before: Option<NodeId>,
    pub after: Vec<NodeId>,
}

impl PieceMove {
    const fn new(row: usize, col: usize, jump_over: Option<Piece>, before: Option<NodeId>) -> Self {
        Self {
            row,
            col,
            jump_over,
            before,
            after: Vec::new(),
        }
    }
}

/// Every move sequence available to one piece, rooted at its current square.
///
/// Nodes live in an arena; `after` owns the downward edges and `before` is a
/// plain index back to the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTree {
    nodes: Vec<PieceMove>,
}

impl MoveTree {
    pub fn build(board: &Board, piece: &Piece) -> Self {
        let mut tree = Self {
            nodes: vec![PieceMove::new(piece.row, piece.col, None, None)],
        };

        let mut directions = Vec::with_capacity(2);
        if piece.can_move_up() {
            directions.push(true);
        }
        if piece.can_move_down() {
            directions.push(false);
        }

        for up in directions {
            for left in [true, false] {
                if let Some(child) =
                    tree.extend(board, piece.row, piece.col, left, up, piece.side, None)
                {
                    tree.link(NodeId::ROOT, child);
                }
            }
        }

        tree
    }

    /// Explores one diagonal from `(start_row, start_col)`.
    ///
    /// Looks at most two squares ahead. An empty first square is a plain step,
    /// unless we are already inside a capture chain. An opposing piece followed
    /// by an empty square is a capture, and the chain is then extended to the
    /// left and right in the same vertical direction.
    #[allow(clippy::too_many_arguments)]
    fn extend(
        &mut self,
        board: &Board,
        start_row: usize,
        start_col: usize,
        left: bool,
        up: bool,
        side: Side,
        before: Option<NodeId>,
    ) -> Option<NodeId> {
        let d_row: isize = if up { -1 } else { 1 };
        let d_col: isize = if left { -1 } else { 1 };

        let mut jumped: Option<Piece> = None;
        for distance in 1..=2 {
            let (row, col) =
                board.offset(start_row, start_col, d_row * distance, d_col * distance)?;

            match board.get_piece(row, col) {
                None => {
                    let Some(captured) = jumped else {
                        if before.is_some() {
                            return None;
                        }
                        return Some(self.push(PieceMove::new(row, col, None, before)));
                    };

                    let id = self.push(PieceMove::new(row, col, Some(captured), before));
                    for next_left in [true, false] {
                        if let Some(next) =
                            self.extend(board, row, col, next_left, up, side, Some(id))
                        {
                            self.link(id, next);
                        }
                    }
                    return Some(id);
                }
                Some(occupant) if occupant.side == side => return None,
                Some(occupant) => jumped = Some(occupant),
            }
        }

        None
    }

    fn push(&mut self, node: PieceMove) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.before = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.after.push(child);
        }
    }

    /// The starting square of the piece.
    #[allow(clippy::indexing_slicing)]
    pub fn root(&self) -> &PieceMove {
        // the root is pushed on construction and never removed
        &self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> Option<&PieceMove> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => &node.after,
            None => &[],
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_moves(&self) -> bool {
        !self.root().after.is_empty()
    }

    /// Every landing node in breadth-first order, root excluded.
    pub fn all_terminal_moves(&self) -> Vec<NodeId> {
        let mut moves = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        let mut frontier = VecDeque::from([NodeId::ROOT]);

        while let Some(current) = frontier.pop_front() {
            if current != NodeId::ROOT {
                moves.push(current);
            }
            frontier.extend(self.children(current).iter().copied());
        }

        moves
    }

    /// Maps each reachable square to the pieces captured on the way there.
    ///
    /// Each first step from the root is walked breadth-first in turn; when two
    /// chains land on the same square the one visited last is kept.
    pub fn flatten(&self) -> HashMap<(usize, usize), Vec<Piece>> {
        let mut moves = HashMap::new();
        let mut accumulated: Vec<Vec<Piece>> = vec![Vec::new(); self.nodes.len()];

        for &first in self.children(NodeId::ROOT) {
            let mut frontier = VecDeque::from([first]);

            while let Some(current) = frontier.pop_front() {
                let Some(node) = self.get(current) else {
                    continue;
                };

                let mut captured = node
                    .before
                    .and_then(|parent| accumulated.get(parent.0))
                    .cloned()
                    .unwrap_or_default();
                captured.extend(node.jump_over);

                moves.insert((node.row, node.col), captured.clone());
                if let Some(slot) = accumulated.get_mut(current.0) {
                    *slot = captured;
                }
                frontier.extend(node.after.iter().copied());
            }
        }

        moves
    }

    /// Nodes from the first step down to `id`, root excluded.
    pub fn path_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut current = Some(id);

        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            if node.before.is_none() {
                break;
            }
            nodes.push(node_id);
            current = node.before;
        }

        nodes.reverse();
        nodes
    }

    /// Landing squares from the first step down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<(usize, usize)> {
        self.path_nodes(id)
            .into_iter()
            .filter_map(|node_id| self.get(node_id))
            .map(|node| (node.row, node.col))
            .collect()
    }

    /// Pieces jumped on the way to `id`, in the order they were captured.
    pub fn captured(&self, id: NodeId) -> Vec<Piece> {
        self.path_nodes(id)
            .into_iter()
            .filter_map(|node_id| self.get(node_id))
            .filter_map(|node| node.jump_over)
            .collect()
    }
}
