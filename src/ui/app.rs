use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::{Actor, ActorWithMovies, Movie, MovieActor, MovieWithActors};
use crate::viewmodel::{AppViewModel, Health, Observer, WriteFailure};

use super::forms::{step_index, AssociateField, AssociateForm, ConfirmDelete, EntityKind, NameForm};
use super::helpers::{centered_rect, clamp_index, name_items, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown.
const PAGE_STEP: isize = 5;

/// Which column of the catalog screen has focus.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Column {
    Movies,
    Actors,
}

/// Detail view of one movie. Holding the observer keeps the join live; it is
/// released when the screen closes.
struct MovieDetail {
    observer: Observer<MovieWithActors>,
    snapshot: MovieWithActors,
    selected: usize,
}

struct ActorDetail {
    observer: Observer<ActorWithMovies>,
    snapshot: ActorWithMovies,
    selected: usize,
}

enum Screen {
    Catalog,
    Movie(MovieDetail),
    Actor(ActorDetail),
}

enum Mode {
    Normal,
    Naming(NameForm),
    ConfirmDelete(ConfirmDelete),
    Associating(AssociateForm),
}

struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Terminal front end state. Everything it shows comes from the view-model's
/// observable states; every change it makes goes through the view-model's
/// command methods.
pub struct App<'a> {
    vm: &'a AppViewModel,
    movies_observer: Observer<Vec<Movie>>,
    actors_observer: Observer<Vec<Actor>>,
    health_observer: Observer<Health>,
    write_error_observer: Observer<Option<WriteFailure>>,
    movies: Vec<Movie>,
    actors: Vec<Actor>,
    health: Health,
    focus: Column,
    movie_idx: usize,
    actor_idx: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<'a> App<'a> {
    pub fn new(vm: &'a AppViewModel) -> Self {
        let movies_observer = vm.movies().subscribe();
        let actors_observer = vm.actors().subscribe();
        let health_observer = vm.health().subscribe();
        let write_error_observer = vm.last_write_error().subscribe();
        Self {
            movies: movies_observer.get(),
            actors: actors_observer.get(),
            health: health_observer.get(),
            vm,
            movies_observer,
            actors_observer,
            health_observer,
            write_error_observer,
            focus: Column::Movies,
            movie_idx: 0,
            actor_idx: 0,
            screen: Screen::Catalog,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Pull every state that changed since the last frame.
    pub(crate) fn sync(&mut self) {
        if self.movies_observer.has_changed() {
            self.movies = self.movies_observer.borrow().clone();
            self.movie_idx = clamp_index(self.movie_idx, self.movies.len());
        }
        if self.actors_observer.has_changed() {
            self.actors = self.actors_observer.borrow().clone();
            self.actor_idx = clamp_index(self.actor_idx, self.actors.len());
        }
        if self.health_observer.has_changed() {
            self.health = self.health_observer.borrow().clone();
        }
        if self.write_error_observer.has_changed() {
            let failure = self.write_error_observer.borrow().clone();
            if let Some(failure) = failure {
                self.set_status(
                    format!("Could not {}: {}", failure.operation, failure.message),
                    StatusKind::Error,
                );
                self.vm.clear_write_error();
            }
        }

        let mut vanished = None;
        match &mut self.screen {
            Screen::Catalog => {}
            Screen::Movie(detail) => {
                let id = detail.snapshot.movie.id;
                if detail.observer.has_changed() {
                    let snapshot = detail.observer.borrow().clone();
                    if snapshot.movie.id == id {
                        detail.selected = clamp_index(detail.selected, snapshot.actors.len());
                        detail.snapshot = snapshot;
                    }
                }
                if !self.movies.iter().any(|movie| movie.id == id) {
                    vanished = Some("That movie no longer exists.");
                }
            }
            Screen::Actor(detail) => {
                let id = detail.snapshot.actor.id;
                if detail.observer.has_changed() {
                    let snapshot = detail.observer.borrow().clone();
                    if snapshot.actor.id == id {
                        detail.selected = clamp_index(detail.selected, snapshot.movies.len());
                        detail.snapshot = snapshot;
                    }
                }
                if !self.actors.iter().any(|actor| actor.id == id) {
                    vanished = Some("That actor no longer exists.");
                }
            }
        }
        if let Some(message) = vanished {
            self.screen = Screen::Catalog;
            self.set_status(message, StatusKind::Info);
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Naming(form) => self.handle_naming(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Associating(form) => self.handle_associating(code, form),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if self.health.is_fatal() {
            if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
                *exit = true;
            }
            return Ok(Mode::Normal);
        }

        match self.screen {
            Screen::Catalog => Ok(self.handle_catalog_key(code, exit)),
            Screen::Movie(_) | Screen::Actor(_) => Ok(self.handle_detail_key(code, exit)),
        }
    }

    fn handle_catalog_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.focus = match self.focus {
                    Column::Movies => Column::Actors,
                    Column::Actors => Column::Movies,
                };
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.move_selection(isize::MIN),
            KeyCode::End => self.move_selection(isize::MAX),
            KeyCode::Enter => match self.focus {
                Column::Movies => match self.current_movie().cloned() {
                    Some(movie) => self.open_movie(&movie),
                    None => self.set_status("No movie selected.", StatusKind::Error),
                },
                Column::Actors => match self.current_actor().cloned() {
                    Some(actor) => self.open_actor(&actor),
                    None => self.set_status("No actor selected.", StatusKind::Error),
                },
            },
            KeyCode::Char('+') => {
                self.clear_status();
                return Mode::Naming(NameForm::create(self.focused_kind()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                let form = match self.focus {
                    Column::Movies => self.current_movie().map(NameForm::edit_movie),
                    Column::Actors => self.current_actor().map(NameForm::edit_actor),
                };
                match form {
                    Some(form) => {
                        self.clear_status();
                        return Mode::Naming(form);
                    }
                    None => self.set_status("Nothing selected to edit.", StatusKind::Error),
                }
            }
            KeyCode::Char('-') => {
                let confirm = match self.focus {
                    Column::Movies => self.current_movie().map(ConfirmDelete::movie),
                    Column::Actors => self.current_actor().map(ConfirmDelete::actor),
                };
                match confirm {
                    Some(confirm) => {
                        self.clear_status();
                        return Mode::ConfirmDelete(confirm);
                    }
                    None => self.set_status("Nothing selected to delete.", StatusKind::Error),
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                if self.movies.is_empty() || self.actors.is_empty() {
                    self.set_status(
                        "Add at least one movie and one actor first.",
                        StatusKind::Error,
                    );
                } else {
                    self.clear_status();
                    return Mode::Associating(AssociateForm::starting_at(
                        self.movie_idx,
                        self.actor_idx,
                    ));
                }
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                self.vm.seed_demo_data();
                self.set_status("Seeding demonstration data...", StatusKind::Info);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_detail_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let mut open_movie = None;
        let mut open_actor = None;
        let mut back = false;
        let mut status = None;
        let mut next_mode = Mode::Normal;

        match &mut self.screen {
            Screen::Catalog => {}
            Screen::Movie(detail) => {
                let len = detail.snapshot.actors.len();
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc => back = true,
                    KeyCode::Up => detail.selected = step_index(detail.selected, -1, len),
                    KeyCode::Down => detail.selected = step_index(detail.selected, 1, len),
                    KeyCode::Enter => open_actor = detail.snapshot.actors.get(detail.selected).cloned(),
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        next_mode = Mode::Naming(NameForm::edit_movie(&detail.snapshot.movie));
                    }
                    KeyCode::Char('-') => {
                        if let Some(actor) = detail.snapshot.actors.get(detail.selected) {
                            self.vm.delete_movie_actor(MovieActor::new(
                                detail.snapshot.movie.id,
                                actor.id,
                            ));
                            status = Some(format!(
                                "Removed {} from {}.",
                                actor.name, detail.snapshot.movie.name
                            ));
                        }
                    }
                    _ => {}
                }
            }
            Screen::Actor(detail) => {
                let len = detail.snapshot.movies.len();
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc => back = true,
                    KeyCode::Up => detail.selected = step_index(detail.selected, -1, len),
                    KeyCode::Down => detail.selected = step_index(detail.selected, 1, len),
                    KeyCode::Enter => open_movie = detail.snapshot.movies.get(detail.selected).cloned(),
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        next_mode = Mode::Naming(NameForm::edit_actor(&detail.snapshot.actor));
                    }
                    KeyCode::Char('-') => {
                        if let Some(movie) = detail.snapshot.movies.get(detail.selected) {
                            self.vm.delete_movie_actor(MovieActor::new(
                                movie.id,
                                detail.snapshot.actor.id,
                            ));
                            status = Some(format!(
                                "Removed {} from {}.",
                                detail.snapshot.actor.name, movie.name
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }

        if back {
            self.screen = Screen::Catalog;
            self.clear_status();
        } else if let Some(movie) = open_movie {
            self.open_movie(&movie);
        } else if let Some(actor) = open_actor {
            self.open_actor(&actor);
        }
        if let Some(text) = status {
            self.set_status(text, StatusKind::Info);
        }
        next_mode
    }

    fn handle_naming(&mut self, code: KeyCode, mut form: NameForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(format!("{} cancelled.", form.title()), StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_name() {
                Ok(name) => {
                    self.submit_name(&form, name);
                    return Mode::Normal;
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Naming(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match confirm.kind {
                    EntityKind::Movie => {
                        self.vm
                            .delete_movie(Movie::with_id(confirm.id, confirm.name.clone()));
                    }
                    EntityKind::Actor => {
                        self.vm
                            .delete_actor(Actor::with_id(confirm.id, confirm.name.clone()));
                    }
                }
                self.set_status(format!("Deleted {}.", confirm.name), StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_associating(&mut self, code: KeyCode, mut form: AssociateForm) -> Mode {
        let (movies, actors) = (self.movies.len(), self.actors.len());
        match code {
            KeyCode::Esc => {
                self.set_status("Association cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => form.toggle_field(),
            KeyCode::Up => form.move_cursor(-1, movies, actors),
            KeyCode::Down => form.move_cursor(1, movies, actors),
            KeyCode::PageUp => form.move_cursor(-PAGE_STEP, movies, actors),
            KeyCode::PageDown => form.move_cursor(PAGE_STEP, movies, actors),
            KeyCode::Enter => {
                let pair = (
                    self.movies.get(form.movie_idx).cloned(),
                    self.actors.get(form.actor_idx).cloned(),
                );
                if let (Some(movie), Some(actor)) = pair {
                    self.vm
                        .insert_movie_actor(MovieActor::new(movie.id, actor.id));
                    self.set_status(
                        format!("Linked {} with {}.", movie.name, actor.name),
                        StatusKind::Info,
                    );
                    return Mode::Normal;
                }
                self.set_status("Pick a movie and an actor.", StatusKind::Error);
            }
            _ => {}
        }
        Mode::Associating(form)
    }

    fn submit_name(&mut self, form: &NameForm, name: String) {
        match (form.kind, form.id) {
            (EntityKind::Movie, None) => {
                self.vm.insert_movie(Movie::new(name.clone()));
            }
            (EntityKind::Movie, Some(id)) => {
                self.vm.update_movie(Movie::with_id(id, name.clone()));
            }
            (EntityKind::Actor, None) => {
                self.vm.insert_actor(Actor::new(name.clone()));
            }
            (EntityKind::Actor, Some(id)) => {
                self.vm.update_actor(Actor::with_id(id, name.clone()));
            }
        }
        let verb = if form.id.is_some() { "Saved" } else { "Added" };
        self.set_status(format!("{verb} {name}."), StatusKind::Info);
    }

    fn open_movie(&mut self, movie: &Movie) {
        self.vm.select_movie(movie.id);
        let observer = self.vm.movie_with_actors().subscribe();
        let current = observer.get();
        let snapshot = if current.movie.id == movie.id {
            current
        } else {
            MovieWithActors {
                movie: movie.clone(),
                actors: Vec::new(),
            }
        };
        self.screen = Screen::Movie(MovieDetail {
            observer,
            snapshot,
            selected: 0,
        });
        self.clear_status();
    }

    fn open_actor(&mut self, actor: &Actor) {
        self.vm.select_actor(actor.id);
        let observer = self.vm.actor_with_movies().subscribe();
        let current = observer.get();
        let snapshot = if current.actor.id == actor.id {
            current
        } else {
            ActorWithMovies {
                actor: actor.clone(),
                movies: Vec::new(),
            }
        };
        self.screen = Screen::Actor(ActorDetail {
            observer,
            snapshot,
            selected: 0,
        });
        self.clear_status();
    }

    fn move_selection(&mut self, offset: isize) {
        match self.focus {
            Column::Movies => {
                self.movie_idx = step_index(self.movie_idx, offset, self.movies.len());
            }
            Column::Actors => {
                self.actor_idx = step_index(self.actor_idx, offset, self.actors.len());
            }
        }
    }

    fn focused_kind(&self) -> EntityKind {
        match self.focus {
            Column::Movies => EntityKind::Movie,
            Column::Actors => EntityKind::Actor,
        }
    }

    fn current_movie(&self) -> Option<&Movie> {
        self.movies.get(self.movie_idx)
    }

    fn current_actor(&self) -> Option<&Actor> {
        self.actors.get(self.actor_idx)
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    // ---- rendering ----

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Catalog => self.draw_catalog(frame, content_area),
            Screen::Movie(detail) => self.draw_detail(
                frame,
                content_area,
                &detail.snapshot.movie.name,
                "Actors",
                detail.snapshot.actors.iter().map(|actor| actor.name.as_str()),
                detail.selected,
            ),
            Screen::Actor(detail) => self.draw_detail(
                frame,
                content_area,
                &detail.snapshot.actor.name,
                "Movies",
                detail.snapshot.movies.iter().map(|movie| movie.name.as_str()),
                detail.selected,
            ),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Naming(form) => self.draw_name_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Associating(form) => self.draw_associate(frame, area, form),
            Mode::Normal => {}
        }

        if let Health::Fatal(reason) = &self.health {
            self.draw_fatal(frame, area, reason);
        }
    }

    fn draw_catalog(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        self.draw_name_list(
            frame,
            columns[0],
            &format!("Movies ({})", self.movies.len()),
            self.movies.iter().map(|movie| movie.name.as_str()),
            self.movie_idx,
            self.focus == Column::Movies,
        );
        self.draw_name_list(
            frame,
            columns[1],
            &format!("Actors ({})", self.actors.len()),
            self.actors.iter().map(|actor| actor.name.as_str()),
            self.actor_idx,
            self.focus == Column::Actors,
        );
    }

    fn draw_name_list<'n>(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        names: impl IntoIterator<Item = &'n str>,
        selected: usize,
        focused: bool,
    ) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border_style);

        let items = name_items(names, selected, focused);
        if items.is_empty() {
            let paragraph = Paragraph::new(Line::styled(
                "Nothing here yet. Press + to add one.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
    }

    fn draw_detail<'n>(
        &self,
        frame: &mut Frame,
        area: Rect,
        heading: &str,
        linked_title: &str,
        linked: impl IntoIterator<Item = &'n str>,
        selected: usize,
    ) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let header = Paragraph::new(Line::styled(
            heading.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        frame.render_widget(header, rows[0]);

        let items = name_items(linked, selected, true);
        let block = Block::default()
            .title(format!("{linked_title} ({})", items.len()))
            .borders(Borders::ALL);
        if items.is_empty() {
            let paragraph = Paragraph::new(Line::styled(
                "No associations.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(paragraph, rows[1]);
            return;
        }

        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(List::new(items).block(block), rows[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Naming(_)) => &[("[Enter]", " Save   "), ("[Esc]", " Cancel")],
            (_, Mode::ConfirmDelete(_)) => &[("[Y]", " Delete   "), ("[N/Esc]", " Keep")],
            (_, Mode::Associating(_)) => &[
                ("[↑↓]", " Pick   "),
                ("[Tab]", " Switch list   "),
                ("[Enter]", " Link   "),
                ("[Esc]", " Cancel"),
            ],
            (Screen::Catalog, Mode::Normal) => &[
                ("[↑↓]", " Navigate   "),
                ("[Tab]", " Switch   "),
                ("[Enter]", " Open   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[a]", " Associate   "),
                ("[d]", " Demo data   "),
                ("[q]", " Quit"),
            ],
            (_, Mode::Normal) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Open   "),
                ("[e]", " Rename   "),
                ("[-]", " Unlink   "),
                ("[Esc]", " Back   "),
                ("[q]", " Quit"),
            ],
        };

        Line::from(
            keys.iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(key.to_string(), key_style),
                        Span::raw(label.to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_name_form(&self, frame: &mut Frame, area: Rect, form: &NameForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let prefix = "Name: ".len() as u16;
        frame.set_cursor_position((inner.x + prefix + form.value_len() as u16, inner.y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete {} \"{}\"?",
                confirm.kind.label().to_lowercase(),
                confirm.name
            )),
            Line::from("Every association it has is removed as well."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_associate(&self, frame: &mut Frame, area: Rect, form: &AssociateForm) {
        let popup_area = centered_rect(80, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Associate Movie with Actor")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        self.draw_name_list(
            frame,
            columns[0],
            "Movie",
            self.movies.iter().map(|movie| movie.name.as_str()),
            form.movie_idx,
            form.active == AssociateField::Movie,
        );
        self.draw_name_list(
            frame,
            columns[1],
            "Actor",
            self.actors.iter().map(|actor| actor.name.as_str()),
            form.actor_idx,
            form.active == AssociateField::Actor,
        );
    }

    fn draw_fatal(&self, frame: &mut Frame, area: Rect, reason: &str) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Storage Failure")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let lines = vec![
            Line::from(Span::styled(
                "The catalog database can no longer be used.",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(reason.to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "Press q to quit.",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            popup_area,
        );
    }
}
