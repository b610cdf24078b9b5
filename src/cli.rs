//! Interface de linha de comando do `editorial` baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] e flags globais
//! (--role, --actor-id, --offline, --verbose) que identificam quem está agindo.

use clap::{Parser, Subcommand, ValueEnum};

use crate::workflow::{Decision, Role};

/// Fluxo de revisão de manuscritos e resumos de conferência.
#[derive(Debug, Parser)]
#[command(name = "editorial", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Papel do usuário que executa o comando.
    #[arg(long, global = true, value_enum, default_value_t = RoleArg::Admin)]
    pub role: RoleArg,

    /// Id do usuário (para editores, o id do editor).
    #[arg(long, global = true, default_value_t = 1)]
    pub actor_id: u64,

    /// Usa o store local em JSON em vez da API remota.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Papel aceito pela CLI, mapeado para [`Role`] internamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Author,
    Editor,
    ConferenceEditor,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Author => Role::Author,
            RoleArg::Editor => Role::Editor,
            RoleArg::ConferenceEditor => Role::ConferenceEditor,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityArg {
    Manuscript,
    Abstract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecisionArg {
    Accept,
    Reject,
}

impl From<DecisionArg> for Decision {
    fn from(arg: DecisionArg) -> Self {
        match arg {
            DecisionArg::Accept => Decision::Accept,
            DecisionArg::Reject => Decision::Reject,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mostra o estado atual de um manuscrito ou resumo.
    Show { kind: EntityArg, id: u64 },

    /// Mostra a linha do tempo reconstruída a partir do estado.
    Timeline { kind: EntityArg, id: u64 },

    /// Lista as ações que o usuário atual pode executar.
    Actions { kind: EntityArg, id: u64 },

    /// Lista o trabalho atribuído a um editor (padrão: o próprio usuário).
    Assigned { editor_id: Option<u64> },

    /// Acompanha um item até um estado terminal.
    Watch {
        kind: EntityArg,
        id: u64,

        /// Intervalo entre consultas; padrão vem de `poll_interval_ms`.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,

        #[arg(long)]
        max_polls: Option<u32>,
    },

    /// Atribui um editor (admin).
    AssignEditor {
        kind: EntityArg,
        id: u64,
        editor_id: u64,
    },

    /// Atribui um editor de conferência a um resumo revisado (admin).
    AssignConferenceEditor { id: u64, editor_id: u64 },

    /// Registra a revisão do editor ou do editor de conferência.
    Review {
        kind: EntityArg,
        id: u64,

        /// Obrigatório para manuscritos.
        #[arg(long, value_enum)]
        decision: Option<DecisionArg>,

        #[arg(long, short, default_value = "")]
        comment: String,
    },

    /// Rejeita um resumo em qualquer estado não terminal.
    Reject {
        id: u64,

        #[arg(long, short, default_value = "")]
        comment: String,
    },

    /// Registra a decisão final do admin.
    Decide {
        kind: EntityArg,
        id: u64,
        #[arg(value_enum)]
        decision: DecisionArg,

        #[arg(long, short, default_value = "")]
        comment: String,
    },

    /// Solicita o formulário de copyright de um manuscrito aceito.
    RequestCopyright { id: u64 },

    /// Registra o formulário de copyright recebido.
    ReceiveCopyright { id: u64, file: String },

    /// Envia o artigo completo de um resumo aceito.
    SubmitFullPaper { id: u64, files: Vec<String> },

    /// Grava os dados de demonstração no store local (requer --offline).
    Seed,

    /// Executa a demonstração embutida do fluxo de revisão.
    Demo,
}
