use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use tabletalk_core::classify::classify_question;
use tabletalk_core::config::settings::DEFAULT_MEMORY_SIZE;
use tabletalk_core::model::{Dataset, Turn};
use tabletalk_core::store::{flatten, ConversationStore, SessionFile, SessionId};
use tabletalk_llm::{Agent, AgentRequest, Completion, HeadingGenerator, ANALYST_INSTRUCTIONS};
use tabletalk_report::{compile, ReportBlock, ReportRenderer};

use crate::error::SessionError;

/// Everything one user works with: the conversation, the loaded datasets,
/// and the agent that answers questions.
///
/// Owned by the interaction surface and passed explicitly to every
/// operation. Single writer; nothing here is shared between users.
pub struct Session<A> {
    id: SessionId,
    created_at: DateTime<Utc>,
    conversation: ConversationStore,
    datasets: Vec<Dataset>,
    agent: A,
    memory_size: usize,
    /// Turns before this position are hidden from the agent. Moves forward
    /// whenever the data changes, since the agent starts over then.
    memory_start: usize,
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub turns: usize,
    pub blocks: usize,
}

impl<A: Agent> Session<A> {
    /// Start an empty session around `agent`.
    pub fn new(agent: A) -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            conversation: ConversationStore::new(),
            datasets: Vec::new(),
            agent,
            memory_size: DEFAULT_MEMORY_SIZE,
            memory_start: 0,
        }
    }

    /// Rebuild a session from its persisted form, re-reading every dataset
    /// from its source path.
    pub fn restore(file: SessionFile, agent: A) -> Result<Self, SessionError> {
        let datasets = file
            .datasets
            .iter()
            .map(|p| Dataset::from_csv_path(p))
            .collect::<Result<Vec<_>, _>>()?;
        let memory_start = file.memory_start.min(file.conversation.len());
        Ok(Self {
            id: file.id,
            created_at: file.created_at,
            conversation: file.conversation,
            datasets,
            agent,
            memory_size: DEFAULT_MEMORY_SIZE,
            memory_start,
        })
    }

    /// Persistable form. In-memory datasets without a source path are not
    /// kept.
    pub fn to_file(&self) -> SessionFile {
        SessionFile {
            id: self.id.clone(),
            created_at: self.created_at,
            conversation: self.conversation.clone(),
            datasets: self
                .datasets
                .iter()
                .filter_map(|d| d.source.clone())
                .collect(),
            memory_start: self.memory_start,
        }
    }

    /// Number of previous turns sent with each question.
    pub fn memory_size(&mut self, turns: usize) -> &mut Self {
        self.memory_size = turns;
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Load a CSV file and make it available to the agent.
    pub fn load_dataset(&mut self, path: &Path) -> Result<&Dataset, SessionError> {
        let dataset = Dataset::from_csv_path(path)?;
        self.add_dataset(dataset);
        Ok(&self.datasets[self.datasets.len() - 1])
    }

    pub fn add_dataset(&mut self, dataset: Dataset) -> &mut Self {
        tracing::info!(
            name = %dataset.name,
            rows = dataset.row_count(),
            "Dataset loaded"
        );
        self.datasets.push(dataset);
        self.restart_agent();
        self
    }

    pub fn clear_datasets(&mut self) -> &mut Self {
        self.datasets.clear();
        self.restart_agent();
        self
    }

    /// Forget the conversation, including the agent's memory of it.
    pub fn reset_history(&mut self) -> &mut Self {
        self.conversation.clear();
        self.memory_start = 0;
        self.agent.reset();
        tracing::info!(session = %self.id.short(), "History cleared");
        self
    }

    fn restart_agent(&mut self) {
        self.memory_start = self.conversation.len();
        self.agent.reset();
    }

    /// Ask the agent a question about the loaded data and log the turn.
    ///
    /// Fails with the [`SessionError::MissingDataset`] notice, without
    /// calling the agent, when nothing is loaded.
    pub fn ask(&mut self, question: &str) -> Result<&Turn, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        if self.datasets.is_empty() {
            tracing::debug!("Question asked before any dataset was loaded");
            return Err(SessionError::MissingDataset);
        }

        let shape = classify_question(question);
        let history = self.conversation.recent(self.memory_start, self.memory_size);
        let request = AgentRequest {
            question,
            output_type: shape.output_type(),
            datasets: &self.datasets,
            history,
            instructions: ANALYST_INSTRUCTIONS,
        };

        let answer = self.agent.chat(&request)?;
        tracing::info!(
            ?shape,
            kind = %answer.kind(),
            turn = self.conversation.len(),
            "Answer received"
        );
        Ok(self.conversation.push(question, answer))
    }

    /// Compile the selected turns (zero-based, any order) into report blocks.
    pub fn compile_report<C: Completion>(
        &self,
        selection: &[usize],
        headings: &HeadingGenerator<C>,
    ) -> Result<Vec<ReportBlock>, SessionError> {
        let selected = self.conversation.select(selection)?;
        let messages = flatten(&selected);
        let blocks = compile(&messages, &self.conversation.as_context(), headings)?;
        Ok(blocks)
    }

    /// Compile the selected turns and render them to `output`.
    ///
    /// An empty selection is the [`SessionError::EmptySelection`] notice: no
    /// heading is requested and no file is written.
    pub fn export<C: Completion, R: ReportRenderer + ?Sized>(
        &self,
        selection: &[usize],
        headings: &HeadingGenerator<C>,
        renderer: &R,
        output: &Path,
    ) -> Result<ExportSummary, SessionError> {
        let blocks = match self.compile_report(selection, headings) {
            Err(SessionError::EmptySelection) => {
                tracing::debug!("Export requested with no messages selected");
                return Err(SessionError::EmptySelection);
            }
            other => other?,
        };
        renderer.render(&blocks, output)?;
        Ok(ExportSummary {
            path: output.to_path_buf(),
            turns: (blocks.len() - 1) / 2,
            blocks: blocks.len(),
        })
    }

    /// Every turn, for "export everything".
    pub fn all_turns(&self) -> Vec<usize> {
        (0..self.conversation.len()).collect()
    }
}
