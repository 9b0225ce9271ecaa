use crate::constants::{CR, LF, PARAM_SEPARATOR};
use crate::error::Tpg26xError;
use tpg26x_data::Mnemonic;

/// A mnemonic and its parameter fields, ready to be sent to the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    mnemonic: Mnemonic,
    params: Vec<String>,
}

impl Command {
    /// Command without parameters, i.e. a parameter query.
    pub fn new(mnemonic: Mnemonic) -> Command {
        Command {
            mnemonic,
            params: Vec::new(),
        }
    }

    /// Command with parameter fields. Each field must be non-empty printable
    /// ASCII without the field separator.
    pub fn with_params<I, S>(mnemonic: Mnemonic, params: I) -> Result<Command, Tpg26xError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params = params.into_iter().map(Into::into).collect::<Vec<String>>();
        for param in params.iter() {
            let printable = param
                .chars()
                .all(|c| c.is_ascii_graphic() && c != PARAM_SEPARATOR);
            if param.is_empty() || !printable {
                return Err(Tpg26xError::InvalidArgument(format!(
                    "parameter {:?} of {} must be non-empty printable ASCII without '{}'",
                    param, mnemonic, PARAM_SEPARATOR
                )));
            }
        }
        Ok(Command { mnemonic, params })
    }

    pub fn mnemonic(&self) -> Mnemonic {
        self.mnemonic
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Wire form: `MNEMONIC[,param]*` followed by CR LF.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = self.mnemonic.as_str().as_bytes().to_vec();
        for param in self.params.iter() {
            data.push(PARAM_SEPARATOR as u8);
            data.extend_from_slice(param.as_bytes());
        }
        data.extend_from_slice(&[CR, LF]);
        data
    }
}
