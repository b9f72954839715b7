use anyhow::{Context, Result};
use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};
use serde::Deserialize;
use std::path::Path;

fn default_layer_norm_eps() -> f64 {
    1e-12
}

/// Architecture hyperparameters, read from the checkpoint's config.json.
/// Field names follow the Hugging Face DistilBERT config.
#[derive(Debug, Clone, Deserialize)]
pub struct DistilBertConfig {
    pub vocab_size:              usize,
    pub max_position_embeddings: usize,
    pub dim:                     usize,
    pub n_layers:                usize,
    pub n_heads:                 usize,
    pub hidden_dim:              usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps:          f64,
}

impl DistilBertConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read model config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid model config '{}'", path.display()))
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> DistilBertQa<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.dim).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_position_embeddings, self.dim).init(device);
        let embedding_norm     = self.layer_norm(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.n_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let qa_head = LinearConfig::new(self.dim, 2).init(device);
        DistilBertQa { token_embedding, position_embedding, embedding_norm, layers, qa_head }
    }

    fn layer_norm<B: Backend>(&self, device: &B::Device) -> LayerNorm<B> {
        LayerNormConfig::new(self.dim)
            .with_epsilon(self.layer_norm_eps)
            .init(device)
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        // Inference only, so attention dropout stays at zero.
        let self_attn   = MultiHeadAttentionConfig::new(self.dim, self.n_heads)
            .with_dropout(0.0)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.dim, self.hidden_dim).init(device);
        let ffn_linear2 = LinearConfig::new(self.hidden_dim, self.dim).init(device);
        let norm1 = self.layer_norm(device);
        let norm2 = self.layer_norm(device);
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2 }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attn_output = self.self_attn.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm1.forward(x + attn_output);
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + ffn_out)
    }
}

#[derive(Module, Debug)]
pub struct DistilBertQa<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub embedding_norm:     LayerNorm<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub qa_head:            Linear<B>,
}

pub struct QaModelOutput<B: Backend> {
    pub start_logits: Tensor<B, 2>,
    pub end_logits:   Tensor<B, 2>,
}

impl<B: Backend> DistilBertQa<B> {
    /// input_ids: [batch, seq_len] → start_logits, end_logits: [batch, seq_len]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> QaModelOutput<B> {
        let [batch_size, seq_len] = input_ids.dims();

        let tok_emb = self.token_embedding.forward(input_ids);

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut x = self.embedding_norm.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x);
        }

        let logits = self.qa_head.forward(x); // [batch, seq_len, 2]
        let start_logits = logits.clone()
            .slice([0..batch_size, 0..seq_len, 0..1])
            .reshape([batch_size, seq_len]);
        let end_logits = logits
            .slice([0..batch_size, 0..seq_len, 1..2])
            .reshape([batch_size, seq_len]);

        QaModelOutput { start_logits, end_logits }
    }
}

/// Regex remaps from Hugging Face DistilBERT parameter names to the
/// field paths of `DistilBertQa`. Applied in order to every key.
pub const HF_KEY_REMAP: &[(&str, &str)] = &[
    (r"^distilbert\.",                 ""),
    (r"^embeddings\.word_embeddings",     "token_embedding"),
    (r"^embeddings\.position_embeddings", "position_embedding"),
    (r"^embeddings\.LayerNorm",           "embedding_norm"),
    (r"^transformer\.layer\.([0-9]+)",    "layers.$1"),
    (r"\.attention\.q_lin",               ".self_attn.query"),
    (r"\.attention\.k_lin",               ".self_attn.key"),
    (r"\.attention\.v_lin",               ".self_attn.value"),
    (r"\.attention\.out_lin",             ".self_attn.output"),
    (r"\.sa_layer_norm",                  ".norm1"),
    (r"\.ffn\.lin1",                      ".ffn_linear1"),
    (r"\.ffn\.lin2",                      ".ffn_linear2"),
    (r"\.output_layer_norm",              ".norm2"),
    (r"^qa_outputs",                      "qa_head"),
];
