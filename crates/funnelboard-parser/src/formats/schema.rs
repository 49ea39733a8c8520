use crate::errors::ParserError;

/// Worksheet the commercial team publishes the lead table on.
pub const DEFAULT_SHEET_NAME: &str = "Copia de DADOS GERAIS COMERCIAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadColumn {
    LeadId,
    SignupDate,
    MessageDate,
    MeetsRequirements,
    Responded,
    Accepted,
    Consultant,
}

impl LeadColumn {
    pub const ALL: [LeadColumn; 7] = [
        LeadColumn::LeadId,
        LeadColumn::SignupDate,
        LeadColumn::MessageDate,
        LeadColumn::MeetsRequirements,
        LeadColumn::Responded,
        LeadColumn::Accepted,
        LeadColumn::Consultant,
    ];

    /// Exact header text expected in the sheet.
    pub fn header(&self) -> &'static str {
        match self {
            LeadColumn::LeadId => "Number_leads",
            LeadColumn::SignupDate => "Data da assinatura",
            LeadColumn::MessageDate => "Data da mensagem",
            LeadColumn::MeetsRequirements => "Atende aos requisitos",
            LeadColumn::Responded => "Respondeu as msgns",
            LeadColumn::Accepted => "Aceitou",
            LeadColumn::Consultant => "Consultor",
        }
    }

    fn slot(&self) -> usize {
        match self {
            LeadColumn::LeadId => 0,
            LeadColumn::SignupDate => 1,
            LeadColumn::MessageDate => 2,
            LeadColumn::MeetsRequirements => 3,
            LeadColumn::Responded => 4,
            LeadColumn::Accepted => 5,
            LeadColumn::Consultant => 6,
        }
    }
}

/// Position of every required column within a header row.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnIndex {
    positions: [usize; 7],
}

impl ColumnIndex {
    pub fn from_headers<'a, I>(parser: &'static str, headers: I) -> Result<Self, ParserError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();
        let mut positions = [0usize; 7];
        for column in LeadColumn::ALL {
            // Duplicate headers resolve to the leftmost one.
            let position = headers
                .iter()
                .position(|header| *header == column.header())
                .ok_or(ParserError::MissingColumn {
                    parser,
                    column: column.header(),
                })?;
            positions[column.slot()] = position;
        }
        Ok(Self { positions })
    }

    pub fn position(&self, column: LeadColumn) -> usize {
        self.positions[column.slot()]
    }
}
