use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Actor, Movie};

/// Which entity a form or confirmation is about.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum EntityKind {
    Movie,
    Actor,
}

impl EntityKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            EntityKind::Movie => "Movie",
            EntityKind::Actor => "Actor",
        }
    }
}

/// Single-field form used to create or rename a movie or an actor.
#[derive(Clone)]
pub(crate) struct NameForm {
    pub(crate) kind: EntityKind,
    /// `None` while creating, the row id while editing.
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl NameForm {
    pub(crate) fn create(kind: EntityKind) -> Self {
        Self {
            kind,
            id: None,
            name: String::new(),
            error: None,
        }
    }

    pub(crate) fn edit_movie(movie: &Movie) -> Self {
        Self {
            kind: EntityKind::Movie,
            id: Some(movie.id),
            name: movie.name.clone(),
            error: None,
        }
    }

    pub(crate) fn edit_actor(actor: &Actor) -> Self {
        Self {
            kind: EntityKind::Actor,
            id: Some(actor.id),
            name: actor.name.clone(),
            error: None,
        }
    }

    pub(crate) fn title(&self) -> String {
        match self.id {
            Some(_) => format!("Edit {}", self.kind.label()),
            None => format!("Add {}", self.kind.label()),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    /// Validate the input and return the trimmed name ready for persistence.
    pub(crate) fn parse_name(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("{} name is required.", self.kind.label()));
        }
        Ok(name.to_string())
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        let (display, style) = if self.name.is_empty() {
            ("<required>".to_string(), Style::default().fg(Color::DarkGray))
        } else {
            (self.name.clone(), Style::default().fg(Color::Yellow))
        };
        Line::from(vec![Span::raw("Name: "), Span::styled(display, style)])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.name.chars().count()
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) kind: EntityKind,
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl ConfirmDelete {
    pub(crate) fn movie(movie: &Movie) -> Self {
        Self {
            kind: EntityKind::Movie,
            id: movie.id,
            name: movie.name.clone(),
        }
    }

    pub(crate) fn actor(actor: &Actor) -> Self {
        Self {
            kind: EntityKind::Actor,
            id: actor.id,
            name: actor.name.clone(),
        }
    }
}

/// Which picker has focus inside the association form.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum AssociateField {
    #[default]
    Movie,
    Actor,
}

/// State of the "link a movie with an actor" dialog: one cursor per list.
#[derive(Clone, Default)]
pub(crate) struct AssociateForm {
    pub(crate) movie_idx: usize,
    pub(crate) actor_idx: usize,
    pub(crate) active: AssociateField,
}

impl AssociateForm {
    pub(crate) fn starting_at(movie_idx: usize, actor_idx: usize) -> Self {
        Self {
            movie_idx,
            actor_idx,
            active: AssociateField::Movie,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            AssociateField::Movie => AssociateField::Actor,
            AssociateField::Actor => AssociateField::Movie,
        };
    }

    /// Move the cursor of the focused list, clamped to `len`.
    pub(crate) fn move_cursor(&mut self, offset: isize, movies: usize, actors: usize) {
        let (cursor, len) = match self.active {
            AssociateField::Movie => (&mut self.movie_idx, movies),
            AssociateField::Actor => (&mut self.actor_idx, actors),
        };
        *cursor = step_index(*cursor, offset, len);
    }
}

/// Move `current` by `offset` within `0..len`, saturating at both ends.
pub(crate) fn step_index(current: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len - 1;
    if offset.is_negative() {
        current.saturating_sub(offset.unsigned_abs())
    } else {
        current.saturating_add(offset as usize).min(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_do_not_parse() {
        let mut form = NameForm::create(EntityKind::Actor);
        assert!(form.parse_name().is_err());
        for ch in "  Zendaya ".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.parse_name().unwrap(), "Zendaya");
    }

    #[test]
    fn cursor_steps_are_clamped() {
        assert_eq!(step_index(0, -1, 3), 0);
        assert_eq!(step_index(1, 5, 3), 2);
        assert_eq!(step_index(2, -1, 3), 1);
        assert_eq!(step_index(4, 1, 0), 0);
    }
}
