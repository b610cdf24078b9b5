//! Interface de terminal do `editorial`: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners durante chamadas à API e `console`
//! para estilização com cores. O [`Terminal`] imprime manuscritos, resumos,
//! linhas do tempo e erros de validação no formato esperado pelo usuário.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::desk::Assignments;
use crate::error::EditorialError;
use crate::workflow::{
    AbstractStatus, ConferenceAbstract, EditorDirectory, Manuscript, ManuscriptStatus,
    TimelineEvent,
};

/// Spinner exibido enquanto uma requisição está em andamento.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Inicia o spinner com a mensagem fornecida.
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    /// Remove o spinner da tela.
    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

/// Estilos usados na saída do terminal.
pub struct Terminal {
    // Verde para aceitação e sucesso.
    green: Style,
    // Vermelho para rejeição e erros.
    red: Style,
    // Amarelo para estados em andamento.
    yellow: Style,
    dim: Style,
    bold: Style,
}

impl Default for Terminal {
    fn default() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
            bold: Style::new().bold(),
        }
    }
}

impl Terminal {
    fn manuscript_style(&self, status: ManuscriptStatus) -> &Style {
        match status {
            ManuscriptStatus::Rejected | ManuscriptStatus::RejectedByEditor => &self.red,
            ManuscriptStatus::Accepted
            | ManuscriptStatus::AwaitingCopyright
            | ManuscriptStatus::CopyrightReceived => &self.green,
            _ => &self.yellow,
        }
    }

    fn abstract_style(&self, status: AbstractStatus) -> &Style {
        match status {
            AbstractStatus::Rejected => &self.red,
            AbstractStatus::Accepted => &self.green,
            _ => &self.yellow,
        }
    }

    /// Imprime o resumo de um manuscrito.
    pub fn print_manuscript(&self, m: &Manuscript, editors: &dyn EditorDirectory) {
        println!(
            "{} {}",
            self.bold.apply_to(&m.manuscript_id),
            self.dim.apply_to(format!("(#{})", m.id))
        );
        if !m.title.is_empty() {
            println!("  {}", m.title);
        }
        println!(
            "  status:        {}",
            self.manuscript_style(m.status).apply_to(m.status)
        );
        println!("  editor status: {}", m.editor_status());
        if let Some(id) = m.assigned_editor_id {
            println!("  editor:        {}", editors.editor_label(id));
        }
        if let Some(decision) = m.admin_final_decision {
            println!("  final:         {decision}");
        }
    }

    /// Imprime o resumo de um resumo de conferência.
    pub fn print_abstract(&self, a: &ConferenceAbstract, editors: &dyn EditorDirectory) {
        println!(
            "{} {}",
            self.bold.apply_to(&a.title),
            self.dim.apply_to(format!("(abstract #{})", a.id))
        );
        if let Some(conference) = &a.conference {
            println!("  {conference}");
        }
        println!(
            "  status:            {}",
            self.abstract_style(a.status).apply_to(a.status)
        );
        if let Some(id) = a.assigned_editor {
            println!("  editor:            {}", editors.editor_label(id));
        }
        if let Some(id) = a.assigned_conference_editor {
            println!("  conference editor: {}", editors.editor_label(id));
        }
        for file in &a.full_paper_files {
            println!("  full paper:        {}", file.file_name);
        }
    }

    /// Imprime a linha do tempo, um evento por linha.
    pub fn print_timeline(&self, events: &[TimelineEvent]) {
        for event in events {
            println!(
                "  {} {} {}",
                self.dim.apply_to(event.at.format("%Y-%m-%d %H:%M")),
                event.title,
                self.dim.apply_to(format!("({})", event.actor))
            );
            if let Some(comment) = &event.comment {
                println!("      \"{comment}\"");
            }
        }
    }

    /// Lista as ações permitidas ao usuário atual.
    pub fn print_actions(&self, actions: &[&str]) {
        if actions.is_empty() {
            println!("  {}", self.dim.apply_to("no actions available"));
            return;
        }
        for action in actions {
            println!("  {} {action}", self.green.apply_to("→"));
        }
    }

    pub fn print_assignments(&self, assignments: &Assignments) {
        println!("{}", self.bold.apply_to("Manuscripts"));
        if assignments.manuscripts.is_empty() {
            println!("  {}", self.dim.apply_to("none"));
        }
        for m in &assignments.manuscripts {
            println!(
                "  {:<14} {}",
                m.manuscript_id,
                self.manuscript_style(m.status).apply_to(m.status)
            );
        }
        println!("{}", self.bold.apply_to("Abstracts"));
        if assignments.abstracts.is_empty() {
            println!("  {}", self.dim.apply_to("none"));
        }
        for a in &assignments.abstracts {
            println!(
                "  #{:<13} {}",
                a.id,
                self.abstract_style(a.status).apply_to(a.status)
            );
        }
    }

    /// Confirma uma transição aplicada com sucesso.
    pub fn success(&self, message: &str) {
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    /// Exibe um erro com a mensagem específica de validação.
    pub fn error(&self, err: &EditorialError) {
        self.fail(&err.body().message);
    }

    pub fn fail(&self, message: &str) {
        eprintln!("  {} {message}", self.red.apply_to("✗"));
    }
}
