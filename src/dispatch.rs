//! The explicit dispatch surface presentation layers drive.
//!
//! Collaborators never reach into the engine through callbacks; they
//! submit one [`Action`] at a time, receive the events it produced and
//! re-read the session view afterwards.

use crate::error::Result;
use crate::level::LevelId;
use crate::pacer::StepPacer;
use crate::session::{Session, SessionEvent};

/// A user-initiated request against the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SelectLevel(LevelId),
    /// Appends a command id to the program. The dispatch layer does not
    /// re-check usability; the selection surface already gates locked
    /// commands.
    AppendCommand(String),
    RemoveLastCommand,
    ClearProgram,
    Run,
    Step,
    Reset,
    SetScore(f64),
    SetPopulation(f64),
}

impl Session {
    /// Applies one user action and returns the events it produced.
    pub fn dispatch(
        &mut self,
        action: Action,
        pacer: &mut dyn StepPacer,
    ) -> Result<Vec<SessionEvent>> {
        match action {
            Action::SelectLevel(level) => {
                self.select_level(level)?;
                Ok(Vec::new())
            }
            Action::AppendCommand(id) => {
                self.push_command(id);
                Ok(Vec::new())
            }
            Action::RemoveLastCommand => {
                self.remove_last_command();
                Ok(Vec::new())
            }
            Action::ClearProgram => {
                self.clear_program();
                Ok(Vec::new())
            }
            Action::Run => self.run(pacer),
            Action::Step => Ok(self.step()),
            Action::Reset => {
                self.reset();
                Ok(Vec::new())
            }
            Action::SetScore(score) => {
                self.set_score(score);
                Ok(Vec::new())
            }
            Action::SetPopulation(population) => {
                self.set_population(population);
                Ok(Vec::new())
            }
        }
    }
}
